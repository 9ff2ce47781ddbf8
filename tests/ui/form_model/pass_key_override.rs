use regform::form::{FieldLens, FormModel};

#[derive(Clone, regform::form::FormModel)]
struct SignupForm {
    #[form(key = "firstName")]
    first_name: String,
    terms_accepted: bool,
}

fn main() {
    let fields = SignupForm::fields();
    assert_eq!(fields.first_name().key().as_str(), "firstName");
    assert_eq!(fields.terms_accepted().key().as_str(), "terms_accepted");

    let keys = SignupForm::field_keys()
        .iter()
        .map(|key| key.as_str())
        .collect::<Vec<_>>();
    assert_eq!(keys, ["firstName", "terms_accepted"]);

    let mut model = SignupForm {
        first_name: String::new(),
        terms_accepted: false,
    };
    fields.terms_accepted().set(&mut model, true);
    assert!(*fields.terms_accepted().get(&model));
}
