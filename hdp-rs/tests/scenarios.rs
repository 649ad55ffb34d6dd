//! End-to-end behavior of the public API on HTML fragments.

use html_diffpatch::{
    clone, create, diff, html, patch, reverse, unpatch, Change, ChangeKinds, Delta, DiffOptions,
    DiffPatch, DigestObjectHash, Element, Error, Node, PatchOptions,
};
use html_diffpatch::constants::{MAX_DIFF_DEPTH, MAX_PARSE_DEPTH};
use pretty_assertions::assert_eq;

fn parse(markup: &str) -> Node {
    html::parse_str(markup).unwrap()
}

fn print(node: &Node) -> String {
    html::print_to_string(node)
}

/// Diffs, then checks the delta both ways.
fn round_trip(left: &str, right: &str) -> Delta {
    let left = parse(left);
    let right = parse(right);
    let delta = diff(&left, &right).expect("fragments differ");
    assert_eq!(patch(&left, &delta).unwrap(), right);
    assert_eq!(unpatch(&right, &delta).unwrap(), left);
    delta
}

#[test]
fn test_identical_markup_has_no_delta() {
    let left = parse("<div>Hello World</div>");
    let right = parse("<div>Hello World</div>");
    assert!(diff(&left, &right).is_none());
}

#[test]
fn test_text_change() {
    let left = parse("<div>Hello World</div>");
    let right = parse("<div>Hello Universe</div>");
    let delta = diff(&left, &right).unwrap();

    assert_eq!(
        delta.get_str("children.0"),
        Some(&Change::modified("Hello World", "Hello Universe"))
    );

    let patched = print(&patch(&left, &delta).unwrap());
    assert!(patched.contains("Universe"));
    assert!(!patched.contains("World"));
}

#[test]
fn test_attribute_change() {
    let left = parse(r#"<div class="old">Hello</div>"#);
    let right = parse(r#"<div class="new">Hello</div>"#);
    let delta = diff(&left, &right).unwrap();

    assert_eq!(delta.len(), 1);
    assert_eq!(
        delta.to_json_value().unwrap(),
        serde_json::json!({ "attributes.class": ["old", "new"] })
    );
}

#[test]
fn test_element_addition_reverses() {
    let left = parse("<div>Hello</div>");
    let right = parse("<div>Hello<span>World</span></div>");
    let delta = diff(&left, &right).unwrap();

    assert_eq!(
        delta.get_str("children.1"),
        Some(&Change::Added(
            Node::from(Element::new("span").with_child("World")).into()
        ))
    );
    assert_eq!(patch(&right, &reverse(&delta)).unwrap(), left);
}

#[test]
fn test_element_removal() {
    let delta = round_trip("<div>Hello<span>World</span></div>", "<div>Hello</div>");
    assert_eq!(delta.kinds(), ChangeKinds::DELETED);
    assert!(delta.contains_path("children._1"));
}

#[test]
fn test_moves_without_spurious_changes() {
    let left = r#"<ul><li id="a">A</li><li id="b">B</li><li id="c">C</li></ul>"#;
    let right = r#"<ul><li id="b">B</li><li id="c">C</li><li id="a">A</li></ul>"#;
    let delta = round_trip(left, right);

    assert_eq!(delta.len(), 3);
    assert_eq!(delta.kinds(), ChangeKinds::MOVED);
    assert_eq!(
        delta.to_json_value().unwrap(),
        serde_json::json!({
            "children._0": ["", 1, 3],
            "children._1": ["", 2, 3],
            "children._2": ["", 0, 3],
        })
    );
}

#[test]
fn test_longer_move_chains_invert() {
    let left = "<ol><li>1</li><li>2</li><li>3</li><li>4</li><li>5</li></ol>";
    let right = "<ol><li>4</li><li>1</li><li>5</li><li>2</li><li>3</li></ol>";
    let options = DiffOptions::default().with_object_hash(|node: &Node, _: usize| node.text_content());
    let dp = DiffPatch::create(options);

    let left = parse(left);
    let right = parse(right);
    let delta = dp.diff(&left, &right).unwrap();
    assert_eq!(delta.kinds(), ChangeKinds::MOVED);
    assert_eq!(dp.patch(&left, &delta).unwrap(), right);
    assert_eq!(dp.unpatch(&right, &delta).unwrap(), left);
}

#[test]
fn test_moved_and_edited_item() {
    let left = r#"<ul><li id="a">Apple</li><li id="b">Banana</li><li id="c">Cherry</li></ul>"#;
    let right = r#"<ul><li id="c">Cherry pie</li><li id="a">Apple</li><li id="b">Banana</li><li id="d">Date</li></ul>"#;
    let delta = round_trip(left, right);
    assert_eq!(delta.count(ChangeKinds::MOVED), 3);
    assert_eq!(
        delta.get_str("children.0.children.0"),
        Some(&Change::modified("Cherry", "Cherry pie"))
    );
    assert!(matches!(delta.get_str("children.3"), Some(Change::Added(_))));
}

#[test]
fn test_move_onto_deleted_index_still_round_trips() {
    // Moving `c` to index 0 and `a` to index 1 while `b` is deleted would
    // reuse the marker `_1`; those moves are rewritten as edits.
    let left = r#"<ul><li id="a">Apple</li><li id="b">Banana</li><li id="c">Cherry</li></ul>"#;
    let right = r#"<ul><li id="c">Cherry pie</li><li id="a">Apple</li><li id="d">Date</li></ul>"#;
    let delta = round_trip(left, right);
    assert!(!delta.kinds().contains(ChangeKinds::MOVED));
    assert_eq!(
        delta.get_str("children.1.attributes.id"),
        Some(&Change::modified("b", "a"))
    );
}

#[test]
fn test_patch_and_reverse_patch() {
    let left = parse("<div>Hello World</div>");
    let right = parse("<div>Hello Universe</div>");
    let delta = diff(&left, &right).unwrap();

    assert!(print(&patch(&left, &delta).unwrap()).contains("Universe"));
    assert!(print(&patch(&right, &reverse(&delta)).unwrap()).contains("World"));
    assert!(print(&unpatch(&right, &delta).unwrap()).contains("World"));

    let dp = DiffPatch::new();
    let back = dp.patch_with(&right, &delta, PatchOptions { reverse: true }).unwrap();
    assert_eq!(back, left);
}

#[test]
fn test_reverse_twice_is_identity() {
    let left = parse(r#"<ul><li id="a">A</li><li id="b">B</li><li id="c">C</li></ul>"#);
    let right = parse(r#"<ul class="x"><li id="c">C!</li><li id="a">A</li></ul>"#);
    let delta = diff(&left, &right).unwrap();
    assert_eq!(reverse(&reverse(&delta)), delta);
}

#[test]
fn test_clone_is_deep_and_equal() {
    let tree = parse(r#"<div class="test"><p>x</p></div>"#);
    let mut copy = clone(&tree);
    assert_eq!(copy, tree);

    copy.as_element_mut().unwrap().children.clear();
    assert_ne!(copy, tree);
}

#[test]
fn test_custom_instance() {
    let dp = create(
        DiffOptions::default()
            .with_object_hash(DigestObjectHash)
            .with_detect_move(false),
    );
    assert!(!dp.options().arrays.detect_move);

    let left = parse("<ul><li>a</li><li>b</li></ul>");
    let right = parse("<ul><li>b</li><li>a</li></ul>");
    let delta = dp.diff(&left, &right).unwrap();
    assert_eq!(delta.count(ChangeKinds::MOVED), 0);
    assert_eq!(dp.patch(&left, &delta).unwrap(), right);
}

#[test]
fn test_nested_elements() {
    let left = "<div><p>Hello</p><span>World</span></div>";
    let right = "<div><p>Hi</p><span>Universe</span></div>";
    let delta = round_trip(left, right);
    assert_eq!(delta.len(), 2);

    let patched = DiffPatch::new().patch_html(left, &delta).unwrap();
    assert!(patched.contains("Hi"));
    assert!(patched.contains("Universe"));
}

#[test]
fn test_mixed_content() {
    round_trip(
        "<div>Text<span>Element</span>More text</div>",
        "<div>New text<span>New element</span>Final text</div>",
    );
}

#[test]
fn test_empty_element_gains_child() {
    let dp = DiffPatch::new();
    let left = "<div></div>";
    let delta = dp
        .diff_html(left, "<div><span>Content</span></div>")
        .unwrap()
        .unwrap();
    let patched = dp.patch_html(left, &delta).unwrap();
    assert!(patched.contains("<span>Content</span>"));
}

#[test]
fn test_tag_and_shape_changes() {
    round_trip("<div>x</div>", "<section>x</section>");
    round_trip("<div><p>a</p></div>", "<div>a</div>");
    round_trip("<p>a</p>", "<p><b>a</b></p>");
}

#[test]
fn test_json_transport() {
    let left = parse(r#"<ul><li id="a">A</li><li id="b">B</li></ul>"#);
    let right = parse(r#"<ul><li id="b">B</li><li id="a">A</li><li>new</li></ul>"#);
    let delta = diff(&left, &right).unwrap();

    let json = delta.to_json_string_pretty().unwrap();
    let decoded = Delta::from_json_str(&json).unwrap();
    assert_eq!(decoded, delta);
    assert_eq!(patch(&left, &decoded).unwrap(), right);
}

/// `depth` nested `<b>` elements around a text leaf.
fn nested(depth: usize, leaf: &str) -> Node {
    let mut node = Node::text(leaf);
    for _ in 0..depth {
        node = Element::new("b").with_child(node).into();
    }
    node
}

#[test]
fn test_deepest_parsed_tree_survives_json() {
    let markup = format!("{}x{}", "<b>".repeat(MAX_PARSE_DEPTH), "</b>".repeat(MAX_PARSE_DEPTH));
    let deep = parse(&markup);
    assert_eq!(deep, nested(MAX_PARSE_DEPTH, "x"));

    // Replacing the root carries the whole tree in one descriptor.
    let shallow = Node::text("x");
    for (left, right) in [(&shallow, &deep), (&deep, &shallow)] {
        let delta = diff(left, right).unwrap();
        let json = delta.to_json_string().unwrap();
        let decoded = Delta::from_json_str(&json).unwrap();
        assert_eq!(decoded, delta);
        assert_eq!(&patch(left, &decoded).unwrap(), right);
        assert_eq!(&unpatch(right, &decoded).unwrap(), left);
    }

    let too_deep = format!("<b>{markup}</b>");
    assert!(matches!(
        html::parse_str(&too_deep),
        Err(Error::DepthLimit(MAX_PARSE_DEPTH))
    ));
}

#[test]
fn test_diff_at_depth_bound_fits_default_thread_stack() {
    let handle = std::thread::spawn(|| {
        let left = nested(MAX_DIFF_DEPTH + 20, "x");
        let right = nested(MAX_DIFF_DEPTH + 20, "y");
        let delta = diff(&left, &right).unwrap();
        assert_eq!(patch(&left, &delta).unwrap(), right);
        assert_eq!(unpatch(&right, &delta).unwrap(), left);
        delta.max_depth()
    });
    let depth = handle.join().unwrap();
    assert!(depth <= 2 * MAX_DIFF_DEPTH + 1);
}

#[test]
fn test_element_values_with_bad_tag_names_are_rejected() {
    let blank = Delta::from_json_str(r#"{"children.0": [{"tagName": ""}]}"#);
    assert!(matches!(blank, Err(Error::MalformedDelta { .. })));

    let upper = Delta::from_json_str(r#"{"": ["x", {"tagName": "DIV"}]}"#);
    assert!(matches!(upper, Err(Error::MalformedDelta { .. })));

    let tree = parse("<div>a</div>");
    let rename = Delta::from_json_str(r#"{"tagName": ["div", "DIV"]}"#).unwrap();
    assert!(matches!(patch(&tree, &rename), Err(Error::MalformedDelta { .. })));
}

#[test]
fn test_property_filter_skips_attribute() {
    let options = DiffOptions::default().with_property_filter(|name: &str, _: &Element| name != "data-ts");
    let dp = DiffPatch::create(options);
    let delta = dp.diff_html(
        r#"<p data-ts="1" id="a">x</p>"#,
        r#"<p data-ts="2" id="a">x</p>"#,
    );
    assert!(delta.unwrap().is_none());
}

#[test]
fn test_malformed_delta_is_rejected() {
    let tree = parse("<ul><li>a</li></ul>");

    let bad = Delta::from_json_str(r#"{"children._0": ["", 5, 3]}"#).unwrap();
    assert!(matches!(patch(&tree, &bad), Err(Error::MoveOutOfRange { .. })));

    let bad = Delta::from_json_str(r#"{"children.0": ["a", "b", 9]}"#);
    assert!(matches!(bad, Err(Error::MalformedDelta { .. })));
}
