use super::{Codec, DecodeBuf, Decoder, EncodeBuf, Encoder, FromNode, IntoNode, XmlCodec, XmlNodeConverter};
use crate::node::{DataNode, LeafListNode, ListNode, MapEntryNode};
use crate::schema::{
    ContainerSchema, LeafListSchema, LeafSchema, LeafType, ListSchema, Module, OperationSchema,
    SchemaContext, SchemaPath, SchemaRegistry,
};
use crate::xml::Element;
use crate::{ContainerNode, ErrorTag, LeafNode, QName, Status, Value};
use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;
use std::sync::Arc;

const NS: &str = "urn:example:codec";

const STAMPS: &[&str] = &[
    "2020-09-03T16:20:00Z",
    "2020-09-03T16:30:00Z",
    "1999-12-31T23:59:59.5+01:00",
];

fn q(local: &str) -> QName {
    QName::new(NS, local)
}

fn body(op: OperationSchema, input: bool) -> OperationSchema {
    let nodes: Vec<crate::schema::SchemaNode> = vec![
        LeafSchema::new(q("label"), LeafType::String).mandatory().into(),
        LeafSchema::new(q("enabled"), LeafType::Boolean).into(),
        LeafSchema::new(q("offset"), LeafType::Int8).into(),
        LeafSchema::new(q("count"), LeafType::Uint32).into(),
        LeafSchema::new(q("ratio"), LeafType::Decimal64 { fraction_digits: 2 }).into(),
        LeafSchema::new(
            q("mode"),
            LeafType::Enumeration(vec!["fast".to_owned(), "slow".to_owned()]),
        )
        .into(),
        LeafSchema::new(q("verbose"), LeafType::Empty).into(),
        LeafSchema::new(q("at"), LeafType::DateAndTime).into(),
        LeafListSchema::new(q("port"), LeafType::Uint16).into(),
        ContainerSchema::new(q("limits"))
            .with_child(LeafSchema::new(q("max"), LeafType::Uint64))
            .into(),
        ListSchema::new(q("peer"), [q("address")])
            .with_child(LeafSchema::new(q("address"), LeafType::String))
            .with_child(LeafSchema::new(q("weight"), LeafType::Int64))
            .into(),
    ];

    nodes.into_iter().fold(op, |op, node| {
        if input {
            op.with_input(node)
        } else {
            op.with_output(node)
        }
    })
}

fn schema() -> Arc<dyn SchemaRegistry> {
    let sample = body(body(OperationSchema::rpc(q("sample")), true), false);
    Arc::new(SchemaContext::new().with_module(Module::new("codec", NS).with_rpc(sample)))
}

fn input_path() -> SchemaPath {
    SchemaPath::new([q("sample"), q("input")])
}

fn output_path() -> SchemaPath {
    SchemaPath::new([q("sample"), q("output")])
}

fn sample(children: &str) -> Element {
    Element::parse(&format!("<sample xmlns=\"{}\">{}</sample>", NS, children)).unwrap()
}

fn deserialize(children: &str) -> Result<ContainerNode, Status> {
    XmlNodeConverter::new(schema()).deserialize(&input_path(), &sample(children))
}

#[test]
fn deserialize_typed_leaves() {
    let node = deserialize(
        "<count>7</count><label>edge</label><offset>-3</offset><verbose/>\
         <ratio>1.50</ratio><mode>slow</mode><port>22</port><port>830</port>\
         <at>2020-09-03T16:20:00Z</at><enabled>true</enabled>",
    )
    .unwrap();

    assert_eq!(node.name(), &q("input"));
    assert_eq!(node.leaf(&q("label")), Some(&Value::from("edge")));
    assert_eq!(node.leaf(&q("enabled")), Some(&Value::Boolean(true)));
    assert_eq!(node.leaf(&q("offset")), Some(&Value::Int(-3)));
    assert_eq!(node.leaf(&q("count")), Some(&Value::Uint(7)));
    assert_eq!(node.leaf(&q("ratio")), Some(&Value::Decimal("1.50".to_owned())));
    assert_eq!(node.leaf(&q("mode")), Some(&Value::Enumeration("slow".to_owned())));
    assert_eq!(node.leaf(&q("verbose")), Some(&Value::Empty));

    let names: Vec<_> = node.children().iter().map(|c| c.name().local_name()).collect();
    assert_eq!(
        names,
        ["label", "enabled", "offset", "count", "ratio", "mode", "verbose", "at", "port"]
    );
}

#[test]
fn deserialize_nested_structures() {
    let node = deserialize(
        "<label>x</label><limits><max>10</max></limits>\
         <peer><address>10.0.0.1</address><weight>5</weight></peer>\
         <peer><address>10.0.0.2</address></peer>",
    )
    .unwrap();

    match node.child(&q("peer")) {
        Some(DataNode::List(list)) => {
            assert_eq!(list.entries().len(), 2);
            assert_eq!(
                list.entries()[1].leaf(&q("address")),
                Some(&Value::from("10.0.0.2"))
            );
        }
        other => panic!("expected a list, got {:?}", other),
    }

    match node.child(&q("limits")) {
        Some(DataNode::Container(limits)) => {
            assert_eq!(limits.leaf(&q("max")), Some(&Value::Uint(10)));
        }
        other => panic!("expected a container, got {:?}", other),
    }
}

#[test]
fn leaf_whitespace() {
    let node = deserialize(
        "\n  <label> padded\t</label>\n  <offset> -3\n</offset>\n  <verbose> </verbose>\n  \
         <limits>\n    <max> 10 </max>\n  </limits>\n",
    )
    .unwrap();

    assert_eq!(node.leaf(&q("label")), Some(&Value::from(" padded\t")));
    assert_eq!(node.leaf(&q("offset")), Some(&Value::Int(-3)));
    assert_eq!(node.leaf(&q("verbose")), Some(&Value::Empty));
    match node.child(&q("limits")) {
        Some(DataNode::Container(limits)) => {
            assert_eq!(limits.leaf(&q("max")), Some(&Value::Uint(10)));
        }
        other => panic!("expected a container, got {:?}", other),
    }

    let converter = XmlNodeConverter::new(schema());
    let output = ContainerNode::new(q("output")).with_leaf(q("label"), "  two  spaces ");
    let wire = Element::new(q("sample"))
        .with_children(converter.serialize(&output))
        .to_string();
    let parsed = Element::parse(&wire).unwrap();
    assert_eq!(converter.deserialize(&output_path(), &parsed).unwrap(), output);
}

#[test]
fn missing_mandatory_leaf() {
    let err = deserialize("<count>1</count>").unwrap_err();
    assert_eq!(err.tag(), ErrorTag::MissingElement);
    assert_eq!(err.info().bad_element.as_deref(), Some("label"));
}

#[test]
fn wrong_type() {
    let err = deserialize("<label>x</label><offset>300</offset>").unwrap_err();
    assert_eq!(err.tag(), ErrorTag::InvalidValue);
    assert_eq!(err.info().bad_element.as_deref(), Some("offset"));

    let err = deserialize("<label>x</label><at>tomorrow</at>").unwrap_err();
    assert_eq!(err.tag(), ErrorTag::InvalidValue);

    let err = deserialize("<label><nested/></label>").unwrap_err();
    assert_eq!(err.tag(), ErrorTag::BadElement);
}

#[test]
fn duplicates() {
    let err = deserialize("<label>a</label><label>b</label>").unwrap_err();
    assert_eq!(err.tag(), ErrorTag::BadElement);

    let err = deserialize(
        "<label>x</label><peer><address>a</address></peer><peer><address>a</address></peer>",
    )
    .unwrap_err();
    assert_eq!(err.tag(), ErrorTag::BadElement);
}

#[test]
fn list_entry_without_key() {
    let err = deserialize("<label>x</label><peer><weight>1</weight></peer>").unwrap_err();
    assert_eq!(err.tag(), ErrorTag::MissingElement);
}

#[test]
fn unknown_elements_strict_and_lenient() {
    let children = "<label>x</label><color>blue</color>";

    let err = deserialize(children).unwrap_err();
    assert_eq!(err.tag(), ErrorTag::UnknownElement);

    let lenient = XmlNodeConverter::new(schema()).strict(false);
    let node = lenient.deserialize(&input_path(), &sample(children)).unwrap();
    assert_eq!(node.children().len(), 1);

    let foreign = "<label>x</label><label xmlns=\"urn:other\">y</label>";
    let err = deserialize(foreign).unwrap_err();
    assert_eq!(err.tag(), ErrorTag::UnknownElement);
}

#[test]
fn unknown_path() {
    let converter = XmlNodeConverter::new(schema());
    let path = SchemaPath::new([q("nope"), q("input")]);

    let err = converter.deserialize(&path, &sample("")).unwrap_err();
    assert_eq!(err.tag(), ErrorTag::OperationFailed);
}

#[derive(Debug, PartialEq)]
struct Label(String);

impl FromNode for Label {
    fn from_node(node: ContainerNode) -> Result<Self, Status> {
        let label = node.required_leaf(&q("label"))?;
        Ok(Label(label.to_string()))
    }
}

impl IntoNode for Label {
    fn into_node(self, name: QName) -> ContainerNode {
        ContainerNode::new(name).with_leaf(q("label"), self.0)
    }
}

#[test]
fn typed_codec() {
    let mut codec = XmlCodec::<Label, Label>::new(schema());

    let element = sample("<label>hello</label>");
    let path = input_path();
    let decoded = codec
        .decoder()
        .decode(&mut DecodeBuf::new(&element, &path))
        .unwrap();
    assert_eq!(decoded, Label("hello".to_owned()));

    let mut out = Vec::new();
    let path = output_path();
    codec
        .encoder()
        .encode(Label("bye".to_owned()), &mut EncodeBuf::new(&mut out, &path))
        .unwrap();
    assert_eq!(out, [Element::new(q("label")).with_text("bye")]);
}

#[derive(Clone, Debug)]
struct SampleOutput(ContainerNode);

fn text(g: &mut Gen) -> String {
    const ALPHABET: &[char] = &['a', 'Z', '0', '-', '<', '>', '&', '"', '\'', ':', 'é', ' ', '\t'];
    let len = usize::arbitrary(g) % 8;
    (0..len).filter_map(|_| g.choose(ALPHABET).copied()).collect()
}

impl Arbitrary for SampleOutput {
    fn arbitrary(g: &mut Gen) -> Self {
        let mut node = ContainerNode::new(q("output")).with_leaf(q("label"), text(g));

        if bool::arbitrary(g) {
            node = node.with_leaf(q("enabled"), bool::arbitrary(g));
        }
        if bool::arbitrary(g) {
            node = node.with_leaf(q("offset"), i64::from(i8::arbitrary(g)));
        }
        if bool::arbitrary(g) {
            node = node.with_leaf(q("count"), u64::from(u32::arbitrary(g)));
        }
        if bool::arbitrary(g) {
            let ratio = format!("{}.{:02}", i32::arbitrary(g), u8::arbitrary(g) % 100);
            node = node.with_leaf(q("ratio"), Value::Decimal(ratio));
        }
        if let Some(mode) = g.choose(&["fast", "slow", ""]).filter(|mode| !mode.is_empty()) {
            node = node.with_leaf(q("mode"), Value::Enumeration((*mode).to_owned()));
        }
        if bool::arbitrary(g) {
            node = node.with_leaf(q("verbose"), Value::Empty);
        }
        if bool::arbitrary(g) {
            if let Some(stamp) = g.choose(STAMPS) {
                node = node.with_leaf(q("at"), *stamp);
            }
        }

        let ports = Vec::<u16>::arbitrary(g);
        if !ports.is_empty() {
            let values = ports.into_iter().map(|port| Value::Uint(port.into()));
            node = node.with_child(DataNode::LeafList(LeafListNode::new(q("port"), values)));
        }

        if bool::arbitrary(g) {
            let mut limits = ContainerNode::new(q("limits"));
            if bool::arbitrary(g) {
                limits = limits.with_leaf(q("max"), u64::arbitrary(g));
            }
            node = node.with_child(DataNode::Container(limits));
        }

        let peers = usize::arbitrary(g) % 4;
        if peers > 0 {
            let entries = (0..peers).map(|i| {
                let mut children = vec![DataNode::Leaf(LeafNode::new(
                    q("address"),
                    format!("10.0.0.{}", i),
                ))];
                if bool::arbitrary(g) {
                    children.push(DataNode::Leaf(LeafNode::new(q("weight"), i64::arbitrary(g))));
                }
                MapEntryNode::new(q("peer"), children)
            });
            let entries: Vec<_> = entries.collect();
            node = node.with_child(DataNode::List(ListNode::new(q("peer"), entries)));
        }

        SampleOutput(node)
    }
}

#[quickcheck]
fn serialize_then_deserialize(output: SampleOutput) -> bool {
    let converter = XmlNodeConverter::new(schema());

    let wire = Element::new(q("sample"))
        .with_children(converter.serialize(&output.0))
        .to_string();
    let parsed = Element::parse(&wire).unwrap();

    converter.deserialize(&output_path(), &parsed).unwrap() == output.0
}
