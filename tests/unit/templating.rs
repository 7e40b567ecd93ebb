use dashvars::templating::{build_key, extract_dependencies, render_template};
use dashvars::variable::{SelectedValue, Variable, VariableSet};

fn dashboard(order_reversed: bool) -> VariableSet {
    let mut variables = vec![
        Variable::custom("env", "prod, dev").with_selection(SelectedValue::single("prod")),
        Variable::custom("region", "eu, us").with_selection(SelectedValue::multi(["eu", "us"])),
        Variable::custom("unrelated", "x, y").with_selection(SelectedValue::single("x")),
        Variable::query("host", "hosts({{.env}}, {{ .region }})"),
    ];
    if order_reversed {
        variables.reverse();
    }
    VariableSet::from_variables(variables).unwrap()
}

#[test]
fn test_extraction_is_idempotent_and_ordered() {
    let template = "{{.b}} {{ .a }} {{.b}} {{.c}}";
    let first = extract_dependencies(template);
    assert_eq!(first, vec!["b", "a", "c"]);
    assert_eq!(extract_dependencies(template), first);
    assert_eq!(extract_dependencies("{{ .a }}{{.a}}"), vec!["a"]);
}

#[test]
fn test_key_ignores_sibling_order() {
    let forward = dashboard(false);
    let reversed = dashboard(true);

    let key_forward = build_key("ns", forward.get("host").unwrap(), &forward).unwrap();
    let key_reversed = build_key("ns", reversed.get("host").unwrap(), &reversed).unwrap();
    assert_eq!(key_forward, key_reversed);
    assert_eq!(key_forward.dependency_signature, "envprodregioneu,us");
}

#[test]
fn test_key_tracks_only_dependencies() {
    let base = dashboard(false);
    let key = build_key("ns", base.get("host").unwrap(), &base).unwrap();

    let mut changed_unrelated = VariableSet::new();
    for variable in base.iter() {
        let variable = if variable.name == "unrelated" {
            variable.clone().with_selection(SelectedValue::single("y"))
        } else {
            variable.clone()
        };
        changed_unrelated.insert(variable).unwrap();
    }
    assert_eq!(
        build_key("ns", changed_unrelated.get("host").unwrap(), &changed_unrelated).unwrap(),
        key
    );

    let mut changed_dependency = VariableSet::new();
    for variable in base.iter() {
        let variable = if variable.name == "env" {
            variable.clone().with_selection(SelectedValue::single("dev"))
        } else {
            variable.clone()
        };
        changed_dependency.insert(variable).unwrap();
    }
    assert_ne!(
        build_key("ns", changed_dependency.get("host").unwrap(), &changed_dependency).unwrap(),
        key
    );
}

#[test]
fn test_key_signature_collision_is_possible() {
    // No separator between name and value.
    let first = VariableSet::from_variables([
        Variable::textbox("ab").with_selection(SelectedValue::single("c")),
        Variable::query("q", "{{.ab}}"),
    ])
    .unwrap();
    let second = VariableSet::from_variables([
        Variable::textbox("a").with_selection(SelectedValue::single("bc")),
        Variable::query("q", "{{.a}}"),
    ])
    .unwrap();

    let first_key = build_key("ns", first.get("q").unwrap(), &first).unwrap();
    let second_key = build_key("ns", second.get("q").unwrap(), &second).unwrap();
    assert_eq!(first_key.dependency_signature, second_key.dependency_signature);
}

#[test]
fn test_textbox_has_no_key() {
    let variables = VariableSet::from_variables([Variable::textbox("search")]).unwrap();
    assert!(build_key("ns", variables.get("search").unwrap(), &variables).is_none());
}

#[test]
fn test_render_joins_multi_values() {
    let variables = dashboard(false);
    assert_eq!(
        render_template("hosts({{.env}}, {{ .region }}, {{.missing}})", &variables),
        "hosts(prod, eu,us, )"
    );
}
