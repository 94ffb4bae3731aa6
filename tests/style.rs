use pretty_assertions::assert_eq;

use pcbsvg::{apply_style_transform, Document, Error, StyleRewriter, ValueTransform};

fn black(_: &str) -> String {
    "#000000".to_string()
}

fn load(style: &str) -> Document {
    let svg = format!("<svg xmlns='http://www.w3.org/2000/svg'><g style='{}'/></svg>", style);
    Document::parse_str(&svg).unwrap()
}

fn style_of(doc: &Document) -> &str {
    doc.get(doc.find_all("g")[0]).attribute("style").unwrap()
}

#[test]
fn transform_single_property() {
    let mut doc = load("fill:#ff0000; fill-opacity:0.5; stroke:#ff0000;");
    let g = doc.find_all("g")[0];
    let transforms: [(&str, ValueTransform); 1] = [("fill", &black)];
    apply_style_transform(&mut doc, g, &transforms).unwrap();
    assert_eq!(style_of(&doc), "fill:#000000; fill-opacity:0.5; stroke:#ff0000;");
}

#[test]
fn transform_multiple_properties() {
    let mut doc = load("stroke-width:0.2;fill:#ff0000;stroke:#00ff00;");
    let g = doc.find_all("g")[0];
    let upper = |v: &str| v.to_uppercase();
    let transforms: [(&str, ValueTransform); 2] = [("fill", &black), ("stroke", &upper)];
    apply_style_transform(&mut doc, g, &transforms).unwrap();
    assert_eq!(style_of(&doc), "stroke-width:0.2;fill:#000000;stroke:#00FF00;");
}

#[test]
fn transform_absent_property() {
    let mut doc = load("fill:none;");
    let g = doc.find_all("g")[0];
    let transforms: [(&str, ValueTransform); 1] = [("stroke", &black)];
    apply_style_transform(&mut doc, g, &transforms).unwrap();
    assert_eq!(style_of(&doc), "fill:none;");
}

#[test]
fn transform_receives_raw_value() {
    let mut doc = load("fill: #abc ;");
    let g = doc.find_all("g")[0];
    let quoted = |v: &str| format!("[{}]", v);
    let transforms: [(&str, ValueTransform); 1] = [("fill", &quoted)];
    apply_style_transform(&mut doc, g, &transforms).unwrap();
    assert_eq!(style_of(&doc), "fill:[ #abc ];");
}

#[test]
fn missing_style_attribute() {
    let mut doc = Document::parse_str("<svg xmlns='http://www.w3.org/2000/svg'><g/></svg>").unwrap();
    let g = doc.find_all("g")[0];
    let transforms: [(&str, ValueTransform); 1] = [("fill", &black)];
    let result = apply_style_transform(&mut doc, g, &transforms);
    assert!(matches!(result, Err(Error::MissingStyleAttribute)));
    assert!(!doc.get(g).has_attribute("style"));
}

#[test]
fn rewriter_reuse() {
    let mut doc = Document::parse_str("\
<svg xmlns='http://www.w3.org/2000/svg'>
    <g style='fill:#111111;'/>
    <g style='stroke:#222222;'/>
</svg>
").unwrap();

    let rewriter = StyleRewriter::new()
        .property("fill", &black)
        .property("stroke", &black);

    for g in doc.find_all("g") {
        rewriter.apply(&mut doc, g).unwrap();
    }

    let styles: Vec<_> = doc.find_all("g").into_iter()
        .map(|id| doc.get(id).attribute("style").unwrap())
        .collect();
    assert_eq!(styles, vec!["fill:#000000;", "stroke:#000000;"]);
    assert_eq!(format!("{:?}", rewriter), "StyleRewriter { properties: [\"fill\", \"stroke\"] }");
}
