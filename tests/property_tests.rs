/// Property-based tests using proptest
/// Tests invariants of sanitization and the standalone predicates for all inputs
use proptest::option;
use proptest::prelude::*;
use mdmc_crm::schemas::{ClientForm, SocialLinksForm};
use mdmc_crm::validation::{
    is_valid_email, is_valid_french_phone, is_valid_url, sanitize_client_data,
};

fn messy_text() -> impl Strategy<Value = Option<String>> {
    option::of("[ \\t]{0,3}[A-Za-zÀ-ÿ@.:/ ]{0,20}[ \\t]{0,3}")
}

prop_compose! {
    fn arb_social_links()(
        instagram in messy_text(),
        spotify in messy_text(),
        youtube in messy_text(),
    ) -> SocialLinksForm {
        SocialLinksForm { instagram, spotify, youtube }
    }
}

prop_compose! {
    fn arb_client_form()(
        nom in messy_text(),
        email in messy_text(),
        telephone in messy_text(),
        genre_musical in messy_text(),
        reseaux_sociaux in option::of(arb_social_links()),
        newsletter_inscrit in option::of(any::<bool>()),
        statut in messy_text(),
        tags in option::of(prop::collection::vec("[a-z]{1,8}", 0..4)),
    ) -> ClientForm {
        ClientForm {
            nom,
            email,
            telephone,
            genre_musical,
            reseaux_sociaux,
            newsletter_inscrit,
            statut,
            tags,
        }
    }
}

// Property: sanitizing is idempotent and leaves no blank strings behind
proptest! {
    #[test]
    fn sanitize_is_idempotent(form in arb_client_form()) {
        let once = sanitize_client_data(&form);
        prop_assert_eq!(sanitize_client_data(&once), once);
    }

    #[test]
    fn sanitized_strings_are_trimmed_and_non_empty(form in arb_client_form()) {
        let clean = sanitize_client_data(&form);
        let links = clean.reseaux_sociaux.clone().unwrap_or_default();
        for value in [
            &clean.nom,
            &clean.email,
            &clean.telephone,
            &clean.genre_musical,
            &clean.statut,
            &links.instagram,
            &links.spotify,
            &links.youtube,
        ]
        .into_iter()
        .flatten()
        {
            prop_assert!(!value.is_empty());
            prop_assert_eq!(value.trim(), value.as_str());
        }
        if let Some(email) = &clean.email {
            prop_assert_eq!(email.to_lowercase(), email.clone());
        }
        prop_assert_eq!(clean.newsletter_inscrit, form.newsletter_inscrit);
        prop_assert_eq!(clean.tags, form.tags);
    }

    #[test]
    fn sanitize_never_keeps_an_empty_link_set(form in arb_client_form()) {
        if let Some(links) = sanitize_client_data(&form).reseaux_sociaux {
            prop_assert!(!links.is_empty());
        }
    }
}

// Property: predicates never panic
proptest! {
    #[test]
    fn phone_validation_never_panics(phone in "\\PC*") {
        let _ = is_valid_french_phone(phone.as_str());
    }

    #[test]
    fn url_validation_never_panics(url in "\\PC*") {
        let _ = is_valid_url(url.as_str());
    }

    #[test]
    fn email_validation_never_panics(email in "\\PC*") {
        let _ = is_valid_email(&email);
    }
}

// Property: French numbers are recognized with or without spacing
proptest! {
    #[test]
    fn valid_french_phones_accepted(
        first in 1u8..=9u8,
        rest in 0u32..=99_999_999u32,
        international in proptest::bool::ANY,
        spaced in proptest::bool::ANY
    ) {
        let digits = format!("{}{:08}", first, rest);
        let prefix = if international { "+33" } else { "0" };
        let phone = if spaced {
            let pairs: Vec<&str> = [&digits[..1], &digits[1..3], &digits[3..5], &digits[5..7], &digits[7..]].to_vec();
            format!("{} {}", prefix, pairs.join(" "))
        } else {
            format!("{}{}", prefix, digits)
        };
        prop_assert!(is_valid_french_phone(phone.as_str()), "rejected {}", phone);
    }

    #[test]
    fn short_numbers_rejected(digits in "[0-9]{1,8}") {
        let phone = format!("0{}", digits);
        prop_assert!(!is_valid_french_phone(phone.as_str()));
    }

    #[test]
    fn leading_zero_after_prefix_rejected(rest in "[0-9]{8}") {
        let phone = format!("00{}", rest);
        prop_assert!(!is_valid_french_phone(phone.as_str()));
    }
}

// Property: well-formed addresses pass the loose email check
proptest! {
    #[test]
    fn simple_addresses_accepted(
        local in "[a-z0-9._]{1,12}",
        domain in "[a-z]{1,10}",
        tld in "[a-z]{2,4}"
    ) {
        let email = format!("{}@{}.{}", local, domain, tld);
        prop_assert!(is_valid_email(&email));
    }
}
