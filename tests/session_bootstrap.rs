// Initial portal login sequence

mod common;

use common::{portal_config, FakePage};
use lead_watch::browser::login::login;

#[tokio::test]
async fn test_login_sequence() {
    let page = FakePage::default();
    login(&page, &portal_config(), "s3cret").await.unwrap();

    assert_eq!(
        page.calls(),
        vec![
            "navigate:https://portal.test/leads",
            "wait:#email",
            "keys:#email:ops@example.com",
            "keys:#password:s3cret",
            "click:button[type='submit']",
            "wait:#cards",
        ]
    );
}

#[tokio::test]
async fn test_login_fails_when_listing_never_appears() {
    let page = FakePage::default().fail_wait_for("#cards");
    let err = login(&page, &portal_config(), "wrong").await.unwrap_err();
    assert!(format!("{:#}", err).contains("listing did not appear"));
}

#[tokio::test]
async fn test_login_fails_without_form() {
    let page = FakePage::default().fail_wait_for("#email");
    assert!(login(&page, &portal_config(), "s3cret").await.is_err());
    assert_eq!(page.count("click:button[type='submit']"), 0);
}
