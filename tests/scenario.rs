//! End-to-end scenarios: template → resolve → edit → merge → resolve,
//! the way the editing host drives the engine.

use pretty_assertions::assert_eq;

use imprint::{
    merge_scene, resolve_batch, resolve_scene, synthesize_layout, AssetPool, Element, ElementKind,
    Frame, ImageElement, QrElement, Record, SequenceElement, SynthConfig, Template, TextAlign,
};

fn record(pairs: &[(&str, &str)]) -> Record {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn badge_template() -> Template {
    let mut template = Template::single_page(210.0, 297.0);
    template.push(Element::text(
        Frame::at(10.0, 10.0, 190.0, 60.0),
        "{{Name}}\n{{City}}",
    ));
    template.push(Element::new(
        Frame::at(10.0, 80.0, 50.0, 50.0),
        ElementKind::Qr(QrElement::field("ProfileUrl")),
    ));
    template
}

fn ann() -> Record {
    record(&[
        ("Name", "Ann"),
        ("City", "Rome"),
        ("ProfileUrl", "http://x/1"),
    ])
}

#[test]
fn test_resolve_badge_scene() {
    let template = badge_template();
    let scene = resolve_scene(&template, &ann(), 0, &AssetPool::new(), None);

    match &scene.pages[0].elements[0].kind {
        ElementKind::Text(t) => assert_eq!(t.content, "Ann\nRome"),
        other => panic!("unexpected kind {:?}", other),
    }
    match &scene.pages[0].elements[1].kind {
        ElementKind::Qr(q) => assert!(q.rendered.is_some()),
        other => panic!("unexpected kind {:?}", other),
    }
    // Ids survive resolution so the host can hand edits back
    assert_eq!(
        scene.pages[0].elements[0].id,
        template.pages[0].elements[0].id
    );
}

#[test]
fn test_unedited_merge_reproduces_template() {
    let template = badge_template();
    let scene = resolve_scene(&template, &ann(), 0, &AssetPool::new(), None);
    assert_eq!(merge_scene(&scene, &template), template);
}

#[test]
fn test_edit_merge_next_record_cycle() {
    // The central editing loop: resolve record 0, user edits the scene,
    // merge, resolve record 1 with the edited layout and record 1's data.
    let template = badge_template();
    let records = vec![
        ann(),
        record(&[
            ("Name", "Bob"),
            ("City", "Oslo"),
            ("ProfileUrl", "http://x/2"),
        ]),
    ];

    let mut scene = resolve_scene(&template, &records[0], 0, &AssetPool::new(), None);
    scene.pages[0].elements[0].frame = Frame::at(20.0, 200.0, 170.0, 40.0);
    match &mut scene.pages[0].elements[0].kind {
        ElementKind::Text(t) => t.style.align = TextAlign::Center,
        other => panic!("unexpected kind {:?}", other),
    }

    let template = merge_scene(&scene, &template);
    let next = resolve_scene(&template, &records[1], 1, &AssetPool::new(), None);

    let el = &next.pages[0].elements[0];
    assert_eq!(el.frame, Frame::at(20.0, 200.0, 170.0, 40.0));
    match &el.kind {
        ElementKind::Text(t) => {
            assert_eq!(t.style.align, TextAlign::Center);
            assert_eq!(t.content, "Bob\nOslo");
        }
        other => panic!("unexpected kind {:?}", other),
    }
}

#[test]
fn test_batch_export() {
    let mut template = badge_template();
    template.push(Element::new(
        Frame::at(150.0, 270.0, 50.0, 10.0),
        ElementKind::Sequence(SequenceElement {
            start: 1,
            prefix: "No. ".into(),
            padding: 3,
            ..Default::default()
        }),
    ));

    let records = vec![
        ann(),
        record(&[("Name", "Bob"), ("City", "Oslo"), ("ProfileUrl", "http://x/2")]),
    ];
    let scenes = resolve_batch(&template, &records, &AssetPool::new(), None);
    assert_eq!(scenes.len(), 2);

    let names: Vec<&str> = scenes
        .iter()
        .map(|s| match &s.pages[0].elements[0].kind {
            ElementKind::Text(t) => t.content.lines().next().unwrap(),
            other => panic!("unexpected kind {:?}", other),
        })
        .collect();
    assert_eq!(names, vec!["Ann", "Bob"]);

    let sequences: Vec<&str> = scenes
        .iter()
        .map(|s| match &s.pages[0].elements[2].kind {
            ElementKind::Sequence(seq) => seq.resolved.as_deref().unwrap(),
            other => panic!("unexpected kind {:?}", other),
        })
        .collect();
    assert_eq!(sequences, vec!["No. 001", "No. 002"]);
}

#[test]
fn test_fuzzy_binding_against_messy_columns() {
    // Dataset columns rarely match bindings exactly
    let template = badge_template();
    let scene = resolve_scene(
        &template,
        &record(&[
            ("full name", "Ann"),
            ("CITY", "Rome"),
            ("profile_url", "http://x/1"),
        ]),
        0,
        &AssetPool::new(),
        None,
    );
    match &scene.pages[0].elements[0].kind {
        ElementKind::Text(t) => assert_eq!(t.content, "Ann\nRome"),
        other => panic!("unexpected kind {:?}", other),
    }
    match &scene.pages[0].elements[1].kind {
        ElementKind::Qr(q) => assert!(q.rendered.is_some()),
        other => panic!("unexpected kind {:?}", other),
    }
}

#[test]
fn test_pool_matched_image_round_trip() {
    let mut pool = AssetPool::new();
    pool.insert("Acme Logo.png", "https://cdn/acme.png");

    let mut template = Template::single_page(210.0, 297.0);
    template.push(Element::new(
        Frame::at(0.0, 0.0, 60.0, 60.0),
        ElementKind::Image(ImageElement::bound("Company")),
    ));

    let scene = resolve_scene(&template, &record(&[("Company", "acme logo")]), 0, &pool, None);
    match &scene.pages[0].elements[0].kind {
        ElementKind::Image(img) => {
            assert_eq!(img.source.as_deref(), Some("https://cdn/acme.png"));
        }
        other => panic!("unexpected kind {:?}", other),
    }

    // The matched source is scene-only state
    let merged = merge_scene(&scene, &template);
    assert_eq!(merged, template);
}

#[test]
fn test_synthesized_template_joins_the_cycle() {
    // Bootstrap from a bare dataset, then run the normal resolve/merge loop
    let fields = vec![
        "Name".to_string(),
        "City".to_string(),
        "Country".to_string(),
    ];
    let sample = record(&[("Name", "Ann"), ("City", "Rome"), ("Country", "Italy")]);

    let template = synthesize_layout(
        None,
        &fields,
        &sample,
        210.0,
        297.0,
        &SynthConfig::default(),
        None,
    );

    let scene = resolve_scene(&template, &sample, 0, &AssetPool::new(), None);
    match &scene.pages[0].elements[0].kind {
        ElementKind::Text(t) => assert_eq!(t.content, "Ann\nRome\nItaly"),
        other => panic!("unexpected kind {:?}", other),
    }
    assert_eq!(merge_scene(&scene, &template), template);
}

#[test]
fn test_scene_json_is_host_readable() {
    let template = badge_template();
    let scene = resolve_scene(&template, &ann(), 0, &AssetPool::new(), None);

    let json = serde_json::to_value(&scene).unwrap();
    let elements = json["pages"][0]["elements"].as_array().unwrap();
    assert_eq!(elements[0]["kind"], "text");
    assert_eq!(elements[0]["content"], "Ann\nRome");
    assert_eq!(elements[1]["kind"], "qr");
    assert!(elements[1]["rendered"]["png"].as_array().is_some());

    // What the host hands back parses as the same scene
    let back: Template = serde_json::from_value(json).unwrap();
    assert_eq!(back, scene);
}
