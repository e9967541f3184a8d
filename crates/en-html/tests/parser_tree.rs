//! Tree-shape tests for the parser on a full note export

use std::fs;
use std::path::PathBuf;

use en_html::{Document, Node, TagKind, parse_bytes};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn parse_fixture(name: &str) -> Document {
    let path = fixtures_dir().join(format!("{}.html", name));
    let bytes = fs::read(&path).expect("Failed to read fixture file");
    parse_bytes(&bytes).expect("Failed to parse fixture")
}

#[test]
fn test_export_has_body() {
    let doc = parse_fixture("trip");
    let body = doc.body().expect("body");
    let kinds: Vec<TagKind> = body.child_elements().map(|e| e.kind()).collect();
    assert_eq!(kinds, vec![TagKind::Heading(1), TagKind::Div, TagKind::Span]);
}

#[test]
fn test_metadata_table_cells() {
    let doc = parse_fixture("trip");
    let table = doc.find(|e| e.name == "table").expect("table");
    let cells: Vec<String> = table
        .child_elements()
        .flat_map(|tbody| tbody.child_elements())
        .flat_map(|tr| tr.child_elements())
        .map(|td| td.text_content())
        .collect();
    assert_eq!(
        cells,
        vec![
            "Created:",
            "6/24/2019 2:05 PM",
            "Updated:",
            "7/1/2019 9:30 AM",
            "Tags:",
            "travel, nb:Personal/Trips"
        ]
    );
}

#[test]
fn test_void_elements_have_no_children() {
    let doc = parse_fixture("trip");
    let img = doc.find(|e| e.name == "img").expect("img");
    assert!(img.children.is_empty());
    assert_eq!(img.attr("data-filename"), Some("map.png"));
    assert_eq!(img.attr("width"), Some("300"));

    let br_div = doc
        .find(|e| e.name == "div" && e.children.len() == 1 && e.children[0].is_element("br"))
        .expect("blank line div");
    assert!(matches!(&br_div.children[0], Node::Element(br) if br.children.is_empty()));
}

#[test]
fn test_take_excises_title() {
    let mut doc = parse_fixture("trip");
    let title = doc.take(|e| e.name == "h1").expect("h1");
    assert_eq!(title.text_content(), "Trip");
    assert!(doc.find(|e| e.name == "h1").is_none());
}

#[test]
fn test_tree_serializes() {
    let doc = parse_fixture("trip");
    let json = serde_json::to_string(&doc).expect("serialize");
    let back: Document = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, doc);
}

#[cfg(feature = "json")]
#[test]
fn test_json_dump() {
    let doc = en_html::parse("<b>hi</b>");
    insta::assert_snapshot!(en_html::to_json(&doc).unwrap(), @r#"
    {
      "children": [
        {
          "element": {
            "name": "html",
            "children": [
              {
                "element": {
                  "name": "head"
                }
              },
              {
                "element": {
                  "name": "body",
                  "children": [
                    {
                      "element": {
                        "name": "b",
                        "children": [
                          {
                            "text": "hi"
                          }
                        ]
                      }
                    }
                  ]
                }
              }
            ]
          }
        }
      ]
    }
    "#);
}
