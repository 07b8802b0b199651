use crate::schema::SchemaPath;
use crate::xml::Element;

/// The input a [`Decoder`](super::Decoder) reads from.
#[derive(Debug)]
pub struct DecodeBuf<'a> {
    element: &'a Element,
    path: &'a SchemaPath,
}

/// The output an [`Encoder`](super::Encoder) writes to.
#[derive(Debug)]
pub struct EncodeBuf<'a> {
    elements: &'a mut Vec<Element>,
    path: &'a SchemaPath,
}

impl<'a> DecodeBuf<'a> {
    pub(crate) fn new(element: &'a Element, path: &'a SchemaPath) -> Self {
        DecodeBuf { element, path }
    }

    /// The element whose children are the operation input.
    pub fn element(&self) -> &'a Element {
        self.element
    }

    /// Absolute schema path of the input structure.
    pub fn path(&self) -> &'a SchemaPath {
        self.path
    }
}

impl<'a> EncodeBuf<'a> {
    pub(crate) fn new(elements: &'a mut Vec<Element>, path: &'a SchemaPath) -> Self {
        EncodeBuf { elements, path }
    }

    /// Absolute schema path of the output structure.
    pub fn path(&self) -> &'a SchemaPath {
        self.path
    }

    /// Append output elements.
    pub fn extend(&mut self, elements: impl IntoIterator<Item = Element>) {
        self.elements.extend(elements);
    }
}
