use std::collections::BTreeMap;

use ontograph::construct::Ontology;
use ontograph::engine::{ClassSpec, DataPropertySpec, ObjectPropertySpec};
use ontograph::error::OntographError;
use ontograph::individual::{DataValueInput, IndividualSpec, ScalarInput};
use ontograph::interface::OntologyInterface;
use ontograph::persist::{Codec, PersistenceMode, Persistor};
use ontograph::rdfxml::RdfXmlCodec;
use ontograph::serialize::{IndividualSummary, RenderedValue};

fn kennel() -> OntologyInterface {
    let iface = OntologyInterface::new(Persistor::new(PersistenceMode::InMemory));
    let empty = RdfXmlCodec::default()
        .encode(&Ontology::new("http://example.org/kennel"))
        .expect("encode");
    iface.load_graph(&empty).expect("load");
    for (name, parents) in [("Animal", vec![]), ("Dog", vec!["Animal".to_string()]), ("Person", vec![])] {
        iface
            .create_class(ClassSpec { name: name.into(), parents })
            .expect("class");
    }
    iface
        .create_data_property(DataPropertySpec {
            property_name: "age".into(),
            domain: vec!["Dog".into()],
            range: "int".into(),
            characteristics: vec!["functional".into()],
        })
        .expect("age");
    iface
        .create_data_property(DataPropertySpec {
            property_name: "nickname".into(),
            range: "str".into(),
            ..DataPropertySpec::default()
        })
        .expect("nickname");
    iface
        .create_object_property(ObjectPropertySpec {
            property_name: "hasOwner".into(),
            domain: vec!["Dog".into()],
            range: vec!["Person".into()],
            characteristics: vec![],
        })
        .expect("hasOwner");
    iface
}

fn named<'a>(summaries: &'a [IndividualSummary], name: &str) -> &'a IndividualSummary {
    summaries
        .iter()
        .find(|s| s.name == name)
        .unwrap_or_else(|| panic!("{name} missing from summaries"))
}

#[test]
fn typed_integer_values_render_as_numbers() {
    let iface = kennel();
    let mut properties = BTreeMap::new();
    properties.insert("age".to_owned(), vec![DataValueInput::typed("3", "xsd:integer")]);
    let summaries = iface
        .create_individual(IndividualSpec {
            name: "Rex".into(),
            classes: vec!["Dog".into()],
            properties,
            ..IndividualSpec::default()
        })
        .expect("rex");
    let rex = named(&summaries, "Rex");
    assert_eq!(rex.types, ["Dog"]);
    assert_eq!(rex.properties["age"], [RenderedValue::Integer(3)]);
    let json = serde_json::to_value(rex).expect("json");
    assert_eq!(json["properties"]["age"][0], serde_json::json!(3));
    assert_eq!(json["type"][0], "Dog");
}

#[test]
fn functional_values_overwrite_and_others_accumulate() {
    let iface = kennel();
    let mut properties = BTreeMap::new();
    properties.insert(
        "age".to_owned(),
        vec![
            DataValueInput::typed("3", "xsd:integer"),
            DataValueInput::typed("4", "xsd:integer"),
        ],
    );
    properties.insert(
        "nickname".to_owned(),
        vec![DataValueInput::plain("Rexy"), DataValueInput::plain("Boss")],
    );
    let summaries = iface
        .create_individual(IndividualSpec {
            name: "Rex".into(),
            classes: vec!["Dog".into()],
            properties,
            ..IndividualSpec::default()
        })
        .expect("rex");
    let rex = named(&summaries, "Rex");
    assert_eq!(rex.properties["age"], [RenderedValue::Integer(4)]);
    assert_eq!(
        rex.properties["nickname"],
        [RenderedValue::Text("Rexy".into()), RenderedValue::Text("Boss".into())]
    );
}

#[test]
fn unresolvable_assertions_are_skipped_not_fatal() {
    let iface = kennel();
    let mut properties = BTreeMap::new();
    properties.insert("weight".to_owned(), vec![DataValueInput::plain("12")]);
    // hasOwner is an object property, so it cannot carry a data value
    properties.insert("hasOwner".to_owned(), vec![DataValueInput::plain("Alice")]);
    properties.insert(
        "nickname".to_owned(),
        vec![DataValueInput {
            value: Some(ScalarInput::Flag(true)),
            ..DataValueInput::default()
        }],
    );
    let mut object_properties = BTreeMap::new();
    object_properties.insert("hasOwner".to_owned(), vec!["Nobody".to_owned()]);
    let summaries = iface
        .create_individual(IndividualSpec {
            name: "Rex".into(),
            classes: vec!["Dog".into()],
            properties,
            object_properties,
            same_as: vec!["Ghost".into()],
            ..IndividualSpec::default()
        })
        .expect("rex");
    let rex = named(&summaries, "Rex");
    assert_eq!(rex.properties.len(), 1);
    assert_eq!(rex.properties["nickname"], [RenderedValue::Text("true".into())]);
}

#[test]
fn extra_classes_and_description_types_become_types() {
    let iface = kennel();
    let summaries = iface
        .create_individual(IndividualSpec {
            name: "Rex".into(),
            classes: vec!["Dog".into(), "Animal".into()],
            description: ontograph::individual::DescriptionInput {
                types: vec!["Person".into(), "Unicorn".into()],
            },
            ..IndividualSpec::default()
        })
        .expect("rex");
    assert_eq!(named(&summaries, "Rex").types, ["Dog", "Animal", "Person"]);
}

#[test]
fn individuals_need_a_resolvable_class() {
    let iface = kennel();
    let err = iface
        .create_individual(IndividualSpec {
            name: "Rex".into(),
            classes: vec!["Wolf".into()],
            ..IndividualSpec::default()
        })
        .unwrap_err();
    assert!(matches!(err, OntographError::ClassNotFound(ref c) if c == "Wolf"));
    assert!(iface.snapshot().expect("snapshot").individuals.is_empty());
}

#[test]
fn object_targets_and_identity_links_resolve_to_individuals() {
    let iface = kennel();
    iface
        .create_individual(IndividualSpec {
            name: "Alice".into(),
            classes: vec!["Person".into()],
            ..IndividualSpec::default()
        })
        .expect("alice");
    let mut object_properties = BTreeMap::new();
    object_properties.insert("hasOwner".to_owned(), vec!["Alice".to_owned()]);
    let summaries = iface
        .create_individual(IndividualSpec {
            name: "Rex".into(),
            classes: vec!["Dog".into()],
            object_properties,
            different_from: vec!["Alice".into()],
            ..IndividualSpec::default()
        })
        .expect("rex");
    assert_eq!(
        named(&summaries, "Rex").properties["hasOwner"],
        [RenderedValue::Text("Alice".into())]
    );
}

#[test]
fn requests_deserialize_from_json() {
    let spec: IndividualSpec = serde_json::from_value(serde_json::json!({
        "name": "Rex",
        "classes": ["Dog"],
        "properties": {"age": [{"value": 3, "datatype": "xsd:integer"}]},
        "description": {"types": ["Animal"]}
    }))
    .expect("spec");
    assert_eq!(spec.properties["age"][0].value, Some(ScalarInput::Number(3u64.into())));
    assert_eq!(spec.description.types, ["Animal"]);
}
