use std::thread;
use std::time::{Duration, Instant};

use futures::executor::block_on;
use regform::prelude::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn engine(submit_delay_ms: u64, reset_delay_ms: u64) -> RegistrationEngine {
    init_tracing();
    RegistrationEngine::new(EngineOptions {
        submit_delay_ms,
        reset_delay_ms,
    })
    .expect("engine")
}

fn wait_until(what: &str, timeout: Duration, mut condition: impl FnMut() -> bool) {
    let started = Instant::now();
    while !condition() {
        assert!(started.elapsed() < timeout, "timed out waiting for {what}");
        thread::sleep(Duration::from_millis(5));
    }
}

fn error_text(engine: &RegistrationEngine, field: Field) -> Option<String> {
    engine.field(field).expect("field view").error
}

#[test]
fn missing_last_name_flow() {
    let engine = engine(0, 0);
    engine.set_text(Field::FirstName, "John").expect("first name");
    engine
        .set_text(Field::Email, "john@example.com")
        .expect("email");
    engine.set_text(Field::Phone, "+12025550199").expect("phone");
    engine.choose_gender(Gender::Male).expect("gender");
    engine.select(Field::Country, "US").expect("country");
    assert!(engine.field(Field::State).expect("state").enabled);
    engine.select(Field::State, "CA").expect("state");
    assert!(engine.field(Field::City).expect("city").enabled);
    engine.select(Field::City, "Los Angeles").expect("city");
    engine
        .set_text(Field::Password, "Password@123")
        .expect("password");
    engine
        .set_text(Field::ConfirmPassword, "Password@123")
        .expect("confirm");
    engine.check(Field::TermsAccepted, true).expect("terms");

    assert!(!engine.submit_enabled().expect("submit"));

    engine.focus(Field::LastName).expect("focus");
    engine.blur(Field::LastName).expect("blur");
    assert_eq!(
        error_text(&engine, Field::LastName).as_deref(),
        Some("This field is required")
    );
    assert!(!engine.submit_enabled().expect("submit"));
}

#[test]
fn successful_registration_flow_resets_after_delay() {
    let engine = engine(20, 300);
    engine.set_text(Field::FirstName, "Jane").expect("first name");
    engine.set_text(Field::LastName, "Doe").expect("last name");
    engine
        .set_text(Field::Email, "jane.doe@gmail.com")
        .expect("email");
    engine.set_text(Field::Phone, "+919876543210").expect("phone");
    engine.choose_gender(Gender::Female).expect("gender");
    engine.select(Field::Country, "IN").expect("country");
    engine.select(Field::State, "MH").expect("state");
    engine.select(Field::City, "Mumbai").expect("city");
    engine
        .set_text(Field::Password, "StrongPass2025!")
        .expect("password");
    engine
        .set_text(Field::ConfirmPassword, "StrongPass2025!")
        .expect("confirm");
    engine.check(Field::TermsAccepted, true).expect("terms");

    assert!(engine.submit_enabled().expect("enabled before click"));

    let driver = engine.clone();
    let submission = thread::spawn(move || block_on(driver.click_submit()));

    wait_until("success notification", Duration::from_secs(5), || {
        engine.notification().expect("notification").is_some()
    });
    let view = engine.view().expect("view");
    let notification = view.notification.expect("notification visible");
    assert!(notification.text().contains("Registration Successful"));
    assert!(
        notification
            .text()
            .contains("Your profile has been submitted successfully.")
    );
    assert!(!view.submit_enabled);
    assert_eq!(
        engine.snapshot().expect("snapshot").model.first_name,
        "Jane",
        "fields stay filled until the reset delay elapses"
    );

    wait_until("form reset", Duration::from_secs(5), || {
        engine
            .snapshot()
            .expect("snapshot")
            .model
            .first_name
            .is_empty()
    });
    let outcome = submission
        .join()
        .expect("submission thread")
        .expect("submission");
    assert!(matches!(outcome, SubmitOutcome::Completed(_)));

    let view = engine.view().expect("view");
    assert_eq!(view.submit_state, SubmitState::Idle);
    assert_eq!(view.notification, None);
    assert!(!view.submit_enabled);
    assert_eq!(view.strength_label, "");
    for field in [
        Field::FirstName,
        Field::LastName,
        Field::Email,
        Field::Phone,
        Field::Country,
        Field::Password,
        Field::ConfirmPassword,
    ] {
        let field_view = view.field(field).expect("field");
        assert_eq!(field_view.value, FieldValue::Text(String::new()), "{field}");
        assert!(field_view.enabled, "{field}");
    }
    for field in [Field::State, Field::City] {
        let field_view = view.field(field).expect("field");
        assert_eq!(field_view.value, FieldValue::Text(String::new()), "{field}");
        assert!(!field_view.enabled, "{field} is disabled after reset");
    }
    assert_eq!(
        view.field(Field::TermsAccepted).map(|f| f.value.clone()),
        Some(FieldValue::Checked(false))
    );
}

#[test]
fn cascading_dropdowns_and_password_rules_flow() {
    let engine = engine(0, 0);
    engine.select(Field::Country, "FR").expect("country");
    assert!(engine.field(Field::State).expect("state").enabled);
    engine.select(Field::State, "IDF").expect("state");
    assert!(engine.field(Field::City).expect("city").enabled);
    engine.select(Field::City, "Paris").expect("city");

    engine.set_text(Field::Password, "123456").expect("password");
    assert!(engine.view().expect("view").strength_label.contains("Weak"));
    engine.clear(Field::Password).expect("clear");
    engine.set_text(Field::Password, "Password1").expect("password");
    assert!(engine.view().expect("view").strength_label.contains("Medium"));
    engine.clear(Field::Password).expect("clear");
    engine
        .set_text(Field::Password, "StrongPass2025!")
        .expect("password");
    assert!(engine.view().expect("view").strength_label.contains("Strong"));

    engine
        .set_text(Field::ConfirmPassword, "WrongPassword")
        .expect("confirm");
    engine.blur(Field::ConfirmPassword).expect("blur");
    assert!(
        error_text(&engine, Field::ConfirmPassword)
            .is_some_and(|error| error.contains("Passwords do not match"))
    );

    engine.clear(Field::ConfirmPassword).expect("clear");
    engine
        .set_text(Field::ConfirmPassword, "StrongPass2025!")
        .expect("confirm");
    engine.blur(Field::ConfirmPassword).expect("blur");
    assert_eq!(error_text(&engine, Field::ConfirmPassword), None);

    engine.set_text(Field::FirstName, "Test").expect("first name");
    engine.set_text(Field::LastName, "User").expect("last name");
    engine
        .set_text(Field::Email, "test.user@example.com")
        .expect("email");
    engine.set_text(Field::Phone, "+33123456789").expect("phone");
    engine.choose_gender(Gender::Male).expect("gender");
    engine.check(Field::TermsAccepted, true).expect("terms");

    assert!(engine.submit_enabled().expect("submit"));
}

#[test]
fn phone_prefix_must_match_country_flow() {
    let engine = engine(0, 0);
    engine.select(Field::Country, "US").expect("country");
    engine.set_text(Field::Phone, "+919876543210").expect("phone");
    engine.blur(Field::Phone).expect("blur");

    assert!(
        error_text(&engine, Field::Phone)
            .is_some_and(|error| error.contains("Phone must start with +1"))
    );
    assert!(!engine.submit_enabled().expect("submit"));
}

#[test]
fn submit_toggles_with_required_field_flow() {
    let engine = engine(0, 0);
    engine.set_text(Field::FirstName, "Toggle").expect("first name");
    engine.set_text(Field::LastName, "Tester").expect("last name");
    engine
        .set_text(Field::Email, "toggle.tester@example.com")
        .expect("email");
    engine.set_text(Field::Phone, "+12025550123").expect("phone");
    engine.choose_gender(Gender::Male).expect("gender");
    engine.select(Field::Country, "US").expect("country");
    engine.select(Field::State, "CA").expect("state");
    engine.select(Field::City, "Los Angeles").expect("city");
    engine
        .set_text(Field::Password, "StrongPass2025!")
        .expect("password");
    engine
        .set_text(Field::ConfirmPassword, "StrongPass2025!")
        .expect("confirm");
    engine.check(Field::TermsAccepted, true).expect("terms");
    assert!(engine.submit_enabled().expect("submit"));

    engine.clear(Field::Email).expect("clear");
    engine.blur(Field::Email).expect("blur");
    assert!(error_text(&engine, Field::Email).is_some());
    assert_eq!(
        engine.field(Field::Email).expect("email").validity,
        Validity::Invalid
    );
    assert!(!engine.submit_enabled().expect("submit"));

    engine
        .set_text(Field::Email, "toggle.tester@example.com")
        .expect("email");
    assert_eq!(error_text(&engine, Field::Email), None);
    assert!(engine.submit_enabled().expect("submit"));

    engine.clear(Field::Email).expect("clear");
    engine.set_text(Field::Email, "bad-email").expect("email");
    engine.blur(Field::Email).expect("blur");
    assert!(error_text(&engine, Field::Email).is_some());
    assert!(!engine.submit_enabled().expect("submit"));
}

#[test]
fn custom_dataset_and_options_load_from_toml() {
    init_tracing();
    let dataset = LocationDataset::from_toml_str(
        r#"
            [[countries]]
            code = "GB"
            name = "United Kingdom"
            dial_code = "+44"
            national_digits = 10

            [[countries.regions]]
            code = "ENG"
            name = "England"
            cities = ["London", "Leeds"]
        "#,
    )
    .expect("dataset");
    let options = EngineOptions::from_toml_str("submit_delay_ms = 0\nreset_delay_ms = 0")
        .expect("options");
    let engine = RegistrationEngine::with_dataset(dataset, options).expect("engine");

    engine.select(Field::Country, "GB").expect("country");
    engine.select(Field::State, "ENG").expect("state");
    assert_eq!(
        engine.cascade().expect("cascade").city_options,
        vec!["London", "Leeds"]
    );
    engine.set_text(Field::Phone, "+12025550199").expect("phone");
    engine.blur(Field::Phone).expect("blur");
    assert_eq!(
        error_text(&engine, Field::Phone).as_deref(),
        Some("Phone must start with +44")
    );
    assert!(matches!(
        engine.select(Field::Country, "US"),
        Err(FormError::OptionUnavailable { .. })
    ));
}
