//! Per-call options: groups, skipping, whitelisting, message shaping and
//! outcome population.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use nebula_constraint::prelude::*;
use nebula_constraint::record::Scope;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[derive(Debug)]
struct User {
    name: Option<String>,
    email: Option<String>,
    role: String,
}

impl_validatable!(User { name, email, role });

fn user(name: Option<&str>, email: Option<&str>, role: &str) -> Arc<User> {
    Arc::new(User {
        name: name.map(str::to_owned),
        email: email.map(str::to_owned),
        role: role.to_owned(),
    })
}

fn validator() -> Validator {
    Validator::new(
        ConstraintRegistry::builder()
            .class(
                ClassSchema::builder::<User>()
                    .property("name", |p| p.rule(is_defined()).rule(min_length(2)))
                    .property("email", |p| {
                        p.rule(is_not_empty().groups(["signup"]))
                            .rule(contains("@").groups(["signup", "profile"]))
                    })
                    .property("role", |p| p.rule(is_in(["admin", "member"])))
                    .build(),
            )
            .build(),
    )
}

fn failed(outcomes: &[FieldOutcome]) -> Vec<String> {
    outcomes
        .iter()
        .flat_map(|o| {
            o.constraints
                .keys()
                .map(move |name| format!("{}.{name}", o.property))
        })
        .collect()
}

// ============================================================================
// GROUPS
// ============================================================================

#[rstest]
#[case::no_groups(ValidatorOptions::new(), &["email.isNotEmpty", "email.contains", "role.isIn"])]
#[case::signup(ValidatorOptions::new().groups(["signup"]), &["email.isNotEmpty", "email.contains"])]
#[case::profile(ValidatorOptions::new().groups(["profile"]), &["email.contains"])]
#[case::profile_always(ValidatorOptions::new().groups(["profile"]).with_always(true), &["email.contains", "role.isIn"])]
#[case::strict(ValidatorOptions::new().with_strict_groups(true), &["role.isIn"])]
fn groups_select_records(#[case] options: ValidatorOptions, #[case] expected: &[&str]) {
    let outcomes = validator()
        .validate_sync_with(user(Some("ann"), Some(""), "guest"), &options)
        .unwrap();
    assert_eq!(failed(&outcomes), expected);
}

#[test]
fn record_always_overrides_groups() {
    let validator = Validator::new(
        ConstraintRegistry::builder()
            .class(
                ClassSchema::builder::<User>()
                    .property("role", |p| p.rule(is_in(["admin"]).groups(["admin"]).always(true)))
                    .build(),
            )
            .build(),
    );
    let options = ValidatorOptions::new().groups(["other"]);
    let outcomes = validator
        .validate_sync_with(user(None, None, "guest"), &options)
        .unwrap();
    assert_eq!(failed(&outcomes), ["role.isIn"]);
}

#[test]
fn group_scoped_gate_only_applies_in_its_group() {
    let validator = Validator::new(
        ConstraintRegistry::builder()
            .class(
                ClassSchema::builder::<User>()
                    .property("role", |p| {
                        p.validate_if_in(
                            |_: &User| false,
                            Scope {
                                groups: vec!["import".into()],
                                always: None,
                            },
                        )
                        .rule(is_in(["admin"]).always(true))
                    })
                    .build(),
            )
            .build(),
    );
    let target = user(None, None, "guest");
    let imported = validator
        .validate_sync_with(Arc::clone(&target), &ValidatorOptions::new().groups(["import"]))
        .unwrap();
    assert!(imported.is_empty());

    let other = validator
        .validate_sync_with(target, &ValidatorOptions::new().groups(["web"]))
        .unwrap();
    assert_eq!(failed(&other), ["role.isIn"]);
}

// ============================================================================
// SKIPPING
// ============================================================================

#[test]
fn presence_checks_survive_skip_missing() {
    let options = ValidatorOptions::new().skip_missing(true);
    let outcomes = validator()
        .validate_sync_with(user(None, None, "admin"), &options)
        .unwrap();
    assert_eq!(failed(&outcomes), ["name.isDefined"]);
    assert_eq!(
        outcomes[0].constraints["isDefined"],
        "name should not be null or undefined"
    );
}

#[test]
fn without_skipping_null_fields_fail_every_check() {
    let outcomes = validator()
        .validate_sync(user(None, Some("a@b"), "admin"))
        .unwrap();
    assert_eq!(failed(&outcomes), ["name.isDefined", "name.minLength"]);
}

#[test]
fn skip_undefined_leaves_null_alone() {
    #[derive(Debug)]
    struct Sparse;

    impl Validatable for Sparse {
        fn property(&self, name: &str) -> Value {
            match name {
                "present" => Value::Null,
                _ => Value::Absent,
            }
        }
    }

    let validator = Validator::new(
        ConstraintRegistry::builder()
            .class(
                ClassSchema::builder::<Sparse>()
                    .property("present", |p| p.rule(is_string()))
                    .property("missing", |p| p.rule(is_string()))
                    .build(),
            )
            .build(),
    );
    let outcomes = validator
        .validate_sync_with(Arc::new(Sparse), &ValidatorOptions::new().skip_undefined(true))
        .unwrap();
    assert_eq!(failed(&outcomes), ["present.isString"]);

    let outcomes = validator
        .validate_sync_with(Arc::new(Sparse), &ValidatorOptions::new().skip_null(true))
        .unwrap();
    assert_eq!(failed(&outcomes), ["missing.isString"]);
}

#[test]
fn stop_at_first_error_keeps_one_failure_per_field() {
    let options = ValidatorOptions::new().stop_at_first_error(true);
    let outcomes = validator()
        .validate_sync_with(user(None, Some(""), "guest"), &options)
        .unwrap();
    assert_eq!(
        failed(&outcomes),
        ["name.isDefined", "email.isNotEmpty", "role.isIn"]
    );
}

#[derive(Debug)]
struct Folder {
    label: String,
    owner: Arc<Member>,
}

#[derive(Debug)]
struct Member {
    handle: String,
}

impl_validatable!(Folder { label, owner });
impl_validatable!(Member { handle });

#[test]
fn stop_at_first_error_still_traverses_nested_fields() {
    let validator = Validator::new(
        ConstraintRegistry::builder()
            .class(
                ClassSchema::builder::<Folder>()
                    .property("label", |p| p.rule(is_not_empty()))
                    .property("owner", |p| p.rule(is_object()).nested())
                    .build(),
            )
            .class(
                ClassSchema::builder::<Member>()
                    .property("handle", |p| p.rule(min_length(3)).rule(contains("@")))
                    .build(),
            )
            .build(),
    );
    let folder = Arc::new(Folder {
        label: String::new(),
        owner: Arc::new(Member {
            handle: "x".to_owned(),
        }),
    });

    let outcomes = validator
        .validate_sync_with(folder, &ValidatorOptions::new().stop_at_first_error(true))
        .unwrap();

    assert_eq!(failed(&outcomes), ["label.isNotEmpty"]);
    assert_eq!(outcomes[1].property, "owner");
    assert_eq!(failed(&outcomes[1].children), ["handle.minLength"]);
}

// ============================================================================
// REPEATED CONSTRAINTS
// ============================================================================

#[derive(Debug)]
struct Article {
    title: String,
}

impl_validatable!(Article { title });

fn article(title: &str) -> Arc<Article> {
    Arc::new(Article {
        title: title.to_owned(),
    })
}

#[rstest]
#[case::draft_accepts_short_titles("draft", "abcd", &[])]
#[case::draft_rejects_tiny_titles("draft", "ab", &["title.minLength"])]
#[case::publish_rejects_short_titles("publish", "abcd", &["title.minLength"])]
#[case::publish_accepts_long_titles("publish", "a long enough title", &[])]
fn same_constraint_in_two_groups(
    #[case] group: &str,
    #[case] title: &str,
    #[case] expected: &[&str],
) {
    let validator = Validator::new(
        ConstraintRegistry::builder()
            .class(
                ClassSchema::builder::<Article>()
                    .property("title", |p| {
                        p.rule(min_length(3).groups(["draft"]))
                            .rule(min_length(10).groups(["publish"]))
                    })
                    .build(),
            )
            .build(),
    );

    let outcomes = validator
        .validate_sync_with(article(title), &ValidatorOptions::new().groups([group]))
        .unwrap();
    assert_eq!(failed(&outcomes), expected);
}

#[test]
fn same_constraint_under_complementary_conditions() {
    let tagged = |v: &Value, _: &dyn Validatable| v.as_str().is_some_and(|s| s.starts_with('#'));
    let validator = Validator::new(
        ConstraintRegistry::builder()
            .class(
                ClassSchema::builder::<Article>()
                    .property("title", move |p| {
                        p.rule(min_length(3).when(tagged))
                            .rule(min_length(10).when(move |v, o| !tagged(v, o)))
                    })
                    .build(),
            )
            .build(),
    );

    let outcomes = validator.validate_sync(article("#rust")).unwrap();
    assert!(outcomes.is_empty());

    let outcomes = validator.validate_sync(article("rust")).unwrap();
    assert_eq!(failed(&outcomes), ["title.minLength"]);
    assert_eq!(
        outcomes[0].constraints["minLength"],
        "title must be longer than or equal to 10 characters"
    );
}

// ============================================================================
// WHITELIST
// ============================================================================

#[test]
fn forbidden_properties_are_reported_first() {
    let validator = Validator::new(
        ConstraintRegistry::builder()
            .class(
                ClassSchema::builder::<User>()
                    .property("name", |p| p.rule(is_not_empty()))
                    .build(),
            )
            .build(),
    );
    let options = ValidatorOptions::new().with_whitelist(true);
    let outcomes = validator
        .validate_sync_with(user(None, Some("a@b"), "admin"), &options)
        .unwrap();

    assert_eq!(
        failed(&outcomes),
        ["email.whitelistValidation", "role.whitelistValidation", "name.isNotEmpty"]
    );
    assert_eq!(
        outcomes[1].constraints["whitelistValidation"],
        "property role should not exist"
    );
    assert_eq!(outcomes[1].value, Some(Value::from("admin")));

    let lenient = ValidatorOptions::new().with_whitelist(false);
    let outcomes = validator
        .validate_sync_with(user(None, Some("a@b"), "admin"), &lenient)
        .unwrap();
    assert_eq!(failed(&outcomes), ["name.isNotEmpty"]);
}

// ============================================================================
// MESSAGES AND POPULATION
// ============================================================================

#[test]
fn message_tokens_and_dismissal() {
    let validator = Validator::new(
        ConstraintRegistry::builder()
            .class(
                ClassSchema::builder::<User>()
                    .property("role", |p| {
                        p.rule(is_in(["admin", "member"]))
                            .rule(max_length(3).message("$target.$property is '$value', limit $constraint1"))
                            .rule(is_string().message_with(|args| format!("{} custom", args.property)).when(|_, _| true))
                    })
                    .build(),
            )
            .build(),
    );
    let target = user(None, None, "guest");

    let outcomes = validator.validate_sync(Arc::clone(&target)).unwrap();
    let role = &outcomes[0];
    assert_eq!(
        role.constraints["isIn"],
        "role must be one of the following values: admin, member"
    );
    assert_eq!(role.constraints["maxLength"], "User.role is 'guest', limit 3");
    assert!(!role.constraints.contains_key("isString"));

    let dismissed = ValidatorOptions::new().dismiss_default_messages(true);
    let outcomes = validator.validate_sync_with(target, &dismissed).unwrap();
    assert_eq!(outcomes[0].constraints["isIn"], "");
    assert_eq!(outcomes[0].constraints["maxLength"], "User.role is 'guest', limit 3");
}

#[test]
fn each_and_context() {
    #[derive(Debug)]
    struct Labels {
        items: Vec<String>,
    }

    impl_validatable!(Labels { items });

    let validator = Validator::new(
        ConstraintRegistry::builder()
            .class(
                ClassSchema::builder::<Labels>()
                    .property("items", |p| {
                        p.rule(
                            max_length(4)
                                .each()
                                .context(serde_json::json!({ "code": "LABEL_TOO_LONG" })),
                        )
                    })
                    .build(),
            )
            .build(),
    );
    let outcomes = validator
        .validate_sync(Arc::new(Labels {
            items: vec!["ok".into(), "too long".into()],
        }))
        .unwrap();

    assert_eq!(
        outcomes[0].constraints["maxLength"],
        "each value in items must be shorter than or equal to 4 characters"
    );
    assert_eq!(
        outcomes[0].contexts["maxLength"],
        serde_json::json!({ "code": "LABEL_TOO_LONG" })
    );
}

#[test]
fn outcome_population_follows_options() {
    let options = ValidatorOptions::new().validation_error(false, true);
    let outcomes = validator()
        .validate_sync_with(user(Some("ann"), Some("a@b"), "guest"), &options)
        .unwrap();
    assert!(outcomes[0].target.is_none());
    assert_eq!(outcomes[0].value, Some(Value::from("guest")));
}

#[test]
fn options_load_from_config() {
    let options: ValidatorOptions = serde_json::from_value(serde_json::json!({
        "groups": ["signup"],
        "skipMissingProperties": true,
        "forbidUnknownValues": false
    }))
    .unwrap();

    let outcomes = validator()
        .validate_sync_with(user(Some("ann"), None, "admin"), &options)
        .unwrap();
    assert!(outcomes.is_empty());
    assert!(!options.forbid_unknown_values);
}

// ============================================================================
// MALFORMED METADATA
// ============================================================================

#[rstest]
#[case::empty_name(ClassSchema::builder::<User>().property("", |p| p.rule(is_string())).build())]
#[case::unresolved(ClassSchema::builder::<User>().property("name", |p| p.rule(ConstraintRecord::named("isFoo"))).build())]
fn malformed_metadata_is_fatal(#[case] schema: ClassSchema) {
    let validator = Validator::new(ConstraintRegistry::builder().class(schema).build());
    let error = futures::executor::block_on(validator.validate_or_reject(user(None, None, "x")))
        .unwrap_err();
    assert!(error.is_fault());
    assert!(matches!(
        error,
        RejectError::Fault(ValidationFault::MalformedMetadata { .. })
    ));
}

#[derive(Debug)]
struct Thread {
    title: String,
    author: Arc<Member>,
}

impl_validatable!(Thread { title, author });

#[test]
fn malformed_nested_metadata_is_fatal_before_any_check_runs() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let validator = Validator::new(
        ConstraintRegistry::builder()
            .class(
                ClassSchema::builder::<Thread>()
                    .property("title", move |p| {
                        p.rule(custom("isCounted", "$property is counted", move |_, _| {
                            counter.fetch_add(1, Ordering::SeqCst);
                            true
                        }))
                    })
                    .property("author", |p| p.nested())
                    .build(),
            )
            .class(
                ClassSchema::builder::<Member>()
                    .property("handle", |p| p.rule(ConstraintRecord::named("isHandle")))
                    .build(),
            )
            .build(),
    );
    let thread = Arc::new(Thread {
        title: "hello".to_owned(),
        author: Arc::new(Member {
            handle: "ann".to_owned(),
        }),
    });

    let fault = validator.validate_sync(thread).unwrap_err();
    assert!(matches!(
        fault,
        ValidationFault::MalformedMetadata { ref target, .. } if target == "Member"
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}
