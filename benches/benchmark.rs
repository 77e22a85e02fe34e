use std::collections::BTreeMap;
use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};

use ontograph::construct::Ontology;
use ontograph::individual::{DataValueInput, IndividualSpec};

// A balanced class tree four levels deep with one property and a few hundred individuals.
fn populated() -> Ontology {
    let mut onto = Ontology::new("http://example.org/bench");
    onto.create_class("Root", &[]).expect("root");
    let mut level = vec!["Root".to_owned()];
    for depth in 0..4 {
        let mut next = Vec::new();
        for (i, parent) in level.iter().enumerate() {
            for j in 0..5 {
                let name = format!("C{depth}_{i}_{j}");
                onto.create_class(&name, &[parent.clone()]).expect("class");
                next.push(name);
            }
        }
        level = next;
    }
    onto.create_data_property("score", &[], "int", &[]).expect("score");
    for n in 0..300 {
        let mut properties = BTreeMap::new();
        properties.insert(
            "score".to_owned(),
            vec![DataValueInput::typed(&n.to_string(), "xsd:integer")],
        );
        onto.create_individual(&IndividualSpec {
            name: format!("item{n}"),
            classes: vec![level[n % level.len()].clone()],
            properties,
            ..IndividualSpec::default()
        })
        .expect("individual");
    }
    onto
}

fn resolution(c: &mut Criterion) {
    let onto = populated();
    c.bench_function("resolve by iri", |b| {
        b.iter(|| onto.resolve(black_box("http://example.org/bench#C3_77_2")))
    });
    c.bench_function("resolve by suffix", |b| {
        b.iter(|| onto.resolve(black_box("item299")))
    });
}

fn individual_creation(c: &mut Criterion) {
    let onto = populated();
    let mut properties = BTreeMap::new();
    properties.insert("score".to_owned(), vec![DataValueInput::typed("7", "xsd:integer")]);
    let spec = IndividualSpec {
        name: "fresh".into(),
        classes: vec!["C3_0_0".into()],
        properties,
        ..IndividualSpec::default()
    };
    c.bench_function("create individual", |b| {
        b.iter(|| {
            let mut staged = onto.clone();
            staged.create_individual(black_box(&spec)).expect("individual")
        })
    });
}

fn tree_rendering(c: &mut Criterion) {
    let onto = populated();
    c.bench_function("render class tree", |b| b.iter(|| onto.class_tree_view()));
    c.bench_function("render snapshot", |b| b.iter(|| onto.snapshot()));
}

criterion_group!(benches, resolution, individual_creation, tree_rendering);
criterion_main!(benches);
