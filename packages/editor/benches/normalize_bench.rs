use criterion::{black_box, criterion_group, criterion_main, Criterion};
use folio_editor::{normalize_document, Editor, PluginStack};
use folio_model::{Document, Element, ElementType, Leaf, Mark, Marks, Node, Point, Range};

fn article(sections: usize) -> Document {
    let mut children = Vec::new();
    for section in 0..sections {
        children.push(Node::element(
            ElementType::Paragraph,
            vec![
                Node::text(format!("Section {section} opens with plain text and ")),
                Node::Leaf(Leaf::with_marks("some bold", Marks::none().with(Mark::Bold))),
                Node::Element(Element::new(ElementType::Link, vec![Node::text("a link")]).with_attr("url", "https://x.test")),
                Node::Element(Element::void(ElementType::Reference).with_attr("refId", format!("r{section}"))),
            ],
        ));
        children.push(Node::element(
            ElementType::BulletedList,
            (0..4)
                .map(|item| Node::element(ElementType::ListItem, vec![Node::Element(Element::paragraph(format!("item {item}")))]))
                .collect(),
        ));
        children.push(Node::element(
            ElementType::ImageBlock,
            vec![Node::Element(Element::void(ElementType::Image).with_attr("objectKey", "k"))],
        ));
    }
    Document::new(children)
}

fn normalize_small_document(c: &mut Criterion) {
    let document = article(5);
    let stack = PluginStack::standard();

    c.bench_function("normalize_small_document", |b| {
        b.iter(|| normalize_document(black_box(document.clone()), &stack))
    });
}

fn normalize_large_document(c: &mut Criterion) {
    let document = article(200);
    let stack = PluginStack::standard();

    c.bench_function("normalize_large_document", |b| {
        b.iter(|| normalize_document(black_box(document.clone()), &stack))
    });
}

fn type_into_large_document(c: &mut Criterion) {
    let mut editor = Editor::new(article(200)).unwrap();
    editor.select(Range::collapsed(Point::new([0, 0], 0))).unwrap();

    c.bench_function("type_into_large_document", |b| {
        b.iter(|| {
            editor.insert_text(black_box("x")).unwrap();
            editor.flush()
        })
    });
}

criterion_group!(
    benches,
    normalize_small_document,
    normalize_large_document,
    type_into_large_document
);
criterion_main!(benches);
