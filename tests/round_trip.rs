use std::collections::BTreeMap;

use ontograph::construct::{ClassExpression, Ontology};
use ontograph::error::OntographError;
use ontograph::individual::{DataValueInput, IndividualSpec};
use ontograph::persist::Codec;
use ontograph::rdfxml::RdfXmlCodec;
use ontograph::registry::{Datatype, Range};

const ZOO: &str = "http://example.org/zoo#";

fn zoo() -> Ontology {
    let mut onto = Ontology::new("http://example.org/zoo");
    onto.create_class("Animal", &[]).expect("animal");
    onto.create_class("Pet", &[]).expect("pet");
    onto.create_class("Dog", &["Animal".into(), "Pet".into()]).expect("dog");
    onto.create_class("Person", &[]).expect("person");
    onto.create_object_property(
        "hasOwner",
        &["Animal".into(), "Pet".into()],
        &["Person".into()],
        &["functional".into()],
    )
    .expect("hasOwner");
    onto.create_object_property("knows", &[], &[], &["symmetric".into(), "transitive".into()])
        .expect("knows");
    onto.create_data_property("age", &["Dog".into()], "int", &["functional".into()])
        .expect("age");
    onto.create_data_property("weight", &[], "float", &[]).expect("weight");
    onto.create_data_property("nickname", &[], "locstr", &[]).expect("nickname");
    onto.create_annotation_property("note", &["Dog".into()]).expect("note");

    onto.create_individual(&IndividualSpec {
        name: "Alice".into(),
        classes: vec!["Person".into()],
        ..IndividualSpec::default()
    })
    .expect("alice");
    let mut properties = BTreeMap::new();
    properties.insert("age".to_owned(), vec![DataValueInput::typed("3", "xsd:integer")]);
    properties.insert("weight".to_owned(), vec![DataValueInput::typed("12.5", "xsd:float")]);
    properties.insert(
        "nickname".to_owned(),
        vec![DataValueInput {
            lang: Some("en".into()),
            ..DataValueInput::plain("Rexy")
        }],
    );
    let mut object_properties = BTreeMap::new();
    object_properties.insert("hasOwner".to_owned(), vec!["Alice".to_owned()]);
    let mut annotations = BTreeMap::new();
    annotations.insert("note".to_owned(), vec!["good boy".to_owned()]);
    onto.create_individual(&IndividualSpec {
        name: "Rex".into(),
        classes: vec!["Dog".into()],
        properties,
        object_properties,
        annotations,
        different_from: vec!["Alice".into()],
        ..IndividualSpec::default()
    })
    .expect("rex");
    onto
}

fn round_trip(onto: &Ontology) -> Ontology {
    let codec = RdfXmlCodec::default();
    let bytes = codec.encode(onto).expect("encode");
    codec.decode(&bytes).expect("decode")
}

#[test]
fn decoding_an_encoding_gives_back_the_same_graph() {
    let original = zoo();
    let restored = round_trip(&original);
    assert_eq!(restored.iri(), original.iri());
    assert_eq!(restored.snapshot(), original.snapshot());
    for name in ["Rex", "Alice"] {
        let iri = format!("{ZOO}{name}");
        assert_eq!(
            restored.individuals().get(&iri),
            original.individuals().get(&iri),
            "{name} differs after a round trip"
        );
    }
}

#[test]
fn multi_class_domains_survive_as_intersections() {
    let restored = round_trip(&zoo());
    let owner = restored
        .properties()
        .get(&format!("{ZOO}hasOwner"))
        .expect("hasOwner");
    assert_eq!(
        owner.domain(),
        Some(&ClassExpression::IntersectionOf(vec![
            ClassExpression::named(format!("{ZOO}Animal")),
            ClassExpression::named(format!("{ZOO}Pet")),
        ]))
    );
    assert!(owner.is_functional());
    let age = restored.properties().get(&format!("{ZOO}age")).expect("age");
    assert_eq!(age.range(), &Range::Datatype(Datatype::from_name("int").expect("int")));
}

#[test]
fn encoding_is_stable() {
    let codec = RdfXmlCodec::default();
    let onto = zoo();
    let first = codec.encode(&onto).expect("encode");
    let second = codec.encode(&round_trip(&onto)).expect("encode again");
    assert_eq!(String::from_utf8_lossy(&first), String::from_utf8_lossy(&second));
}

#[test]
fn class_expressions_in_documents_round_trip() {
    let doc = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:rdfs="http://www.w3.org/2000/01/rdf-schema#"
         xmlns:owl="http://www.w3.org/2002/07/owl#">
  <owl:Ontology rdf:about="http://ex.org/shapes"/>
  <owl:Class rdf:about="http://ex.org/shapes#Circle"/>
  <owl:Class rdf:about="http://ex.org/shapes#Square"/>
  <owl:Class rdf:about="http://ex.org/shapes#Blob">
    <rdfs:subClassOf>
      <owl:Class>
        <owl:complementOf rdf:resource="http://ex.org/shapes#Square"/>
      </owl:Class>
    </rdfs:subClassOf>
  </owl:Class>
  <owl:ObjectProperty rdf:about="http://ex.org/shapes#touches">
    <rdfs:range>
      <owl:Class>
        <owl:unionOf rdf:parseType="Collection">
          <rdf:Description rdf:about="http://ex.org/shapes#Circle"/>
          <rdf:Description rdf:about="http://ex.org/shapes#Square"/>
        </owl:unionOf>
      </owl:Class>
    </rdfs:range>
  </owl:ObjectProperty>
</rdf:RDF>"#;
    let codec = RdfXmlCodec::default();
    let loaded = codec.decode(doc.as_bytes()).expect("decode");
    let touches = loaded
        .properties()
        .get("http://ex.org/shapes#touches")
        .expect("touches");
    assert_eq!(
        touches.range(),
        &Range::Classes(ClassExpression::UnionOf(vec![
            ClassExpression::named("http://ex.org/shapes#Circle"),
            ClassExpression::named("http://ex.org/shapes#Square"),
        ]))
    );
    let blob = loaded.classes().get("http://ex.org/shapes#Blob").expect("blob");
    assert_eq!(
        blob.anonymous_parents(),
        [ClassExpression::ComplementOf(Box::new(ClassExpression::named(
            "http://ex.org/shapes#Square"
        )))]
    );
    let restored = round_trip(&loaded);
    assert_eq!(restored.snapshot(), loaded.snapshot());
    assert_eq!(
        restored.classes().get("http://ex.org/shapes#Blob"),
        Some(blob)
    );
}

const SHOP: &str = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:owl="http://www.w3.org/2002/07/owl#"
         xmlns:o="http://ex.org/shop#">
  <owl:Ontology rdf:about="http://ex.org/shop"/>
  <owl:Class rdf:about="http://ex.org/shop#Order"/>
  <owl:DatatypeProperty rdf:about="http://ex.org/shop#price"/>
  <owl:DatatypeProperty rdf:about="http://ex.org/shop#at"/>
  <owl:DatatypeProperty rdf:about="http://ex.org/shop#items"/>
  <owl:ObjectProperty rdf:about="http://ex.org/o/42"/>
  <owl:NamedIndividual rdf:about="http://ex.org/shop#order1">
    <rdf:type rdf:resource="http://ex.org/shop#Order"/>
    <o:price rdf:datatype="http://www.w3.org/2001/XMLSchema#decimal">1.50</o:price>
    <o:at rdf:datatype="http://www.w3.org/2001/XMLSchema#dateTime">2024-02-29T10:15:00+02:00</o:at>
    <o:items rdf:datatype="http://www.w3.org/2001/XMLSchema#nonNegativeInteger">7</o:items>
  </owl:NamedIndividual>
</rdf:RDF>"#;

#[test]
fn typed_literals_are_written_back_as_read() {
    let codec = RdfXmlCodec::default();
    let loaded = codec.decode(SHOP.as_bytes()).expect("decode");
    let written = String::from_utf8(codec.encode(&loaded).expect("encode")).expect("utf8");
    assert!(written.contains(r#"XMLSchema#decimal">1.50<"#), "{written}");
    assert!(written.contains(r#"XMLSchema#dateTime">2024-02-29T10:15:00+02:00<"#), "{written}");
    assert!(written.contains(r#"XMLSchema#nonNegativeInteger">7<"#), "{written}");

    let restored = codec.decode(written.as_bytes()).expect("decode again");
    let order = "http://ex.org/shop#order1";
    assert_eq!(restored.individuals().get(order), loaded.individuals().get(order));
}

#[test]
fn properties_without_an_element_name_still_encode() {
    let codec = RdfXmlCodec::default();
    let loaded = codec.decode(SHOP.as_bytes()).expect("decode");
    assert!(loaded.properties().get("http://ex.org/o/42").is_some());
    let bytes = codec.encode(&loaded).expect("encode");
    let restored = codec.decode(&bytes).expect("decode again");
    assert!(restored.properties().get("http://ex.org/o/42").is_some());
}

#[test]
fn names_that_break_an_iri_are_refused() {
    let mut onto = Ontology::new("http://ex.org/z");
    let err = onto.create_class("Big Dog", &[]).unwrap_err();
    assert!(matches!(err, OntographError::InvalidRequest(_)));
    assert!(onto.classes().is_empty());
    onto.create_class("BigDog", &[]).expect("big dog");
    let restored = round_trip(&onto);
    assert!(restored.classes().contains("http://ex.org/z#BigDog"));
}
