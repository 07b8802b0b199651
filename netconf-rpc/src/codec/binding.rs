use super::{Codec, DecodeBuf, Decoder, EncodeBuf, Encoder, XmlNodeConverter};
use crate::schema::SchemaRegistry;
use crate::{ContainerNode, QName, Status};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Build a typed operation input from its validated node.
pub trait FromNode: Sized {
    /// Convert `node`. Fails if the node lacks something the type requires.
    fn from_node(node: ContainerNode) -> Result<Self, Status>;
}

/// Turn a typed operation output into a node.
pub trait IntoNode {
    /// Convert `self` into a node named `name`, the output structure's name.
    fn into_node(self, name: QName) -> ContainerNode;
}

impl FromNode for ContainerNode {
    fn from_node(node: ContainerNode) -> Result<Self, Status> {
        Ok(node)
    }
}

impl IntoNode for ContainerNode {
    fn into_node(self, name: QName) -> ContainerNode {
        self.renamed(name)
    }
}

impl FromNode for () {
    fn from_node(_: ContainerNode) -> Result<Self, Status> {
        Ok(())
    }
}

impl IntoNode for () {
    fn into_node(self, name: QName) -> ContainerNode {
        ContainerNode::new(name)
    }
}

/// A [`Codec`] that binds `T` outputs and `U` inputs through an
/// [`XmlNodeConverter`].
pub struct XmlCodec<T, U> {
    converter: XmlNodeConverter,
    _pd: PhantomData<fn() -> (T, U)>,
}

/// A codec working on untyped [`ContainerNode`]s.
pub type NodeCodec = XmlCodec<ContainerNode, ContainerNode>;

impl<T, U> XmlCodec<T, U> {
    /// A strict codec over `schema`.
    pub fn new(schema: Arc<dyn SchemaRegistry>) -> Self {
        XmlCodec::with_converter(XmlNodeConverter::new(schema))
    }

    /// A codec using `converter`.
    pub fn with_converter(converter: XmlNodeConverter) -> Self {
        XmlCodec {
            converter,
            _pd: PhantomData,
        }
    }

    /// Enable or disable rejection of unknown input elements.
    #[must_use]
    pub fn strict(self, strict: bool) -> Self {
        XmlCodec::with_converter(self.converter.strict(strict))
    }

    /// The underlying converter.
    pub fn converter(&self) -> &XmlNodeConverter {
        &self.converter
    }
}

impl<T, U> Clone for XmlCodec<T, U> {
    fn clone(&self) -> Self {
        XmlCodec::with_converter(self.converter.clone())
    }
}

impl<T, U> fmt::Debug for XmlCodec<T, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmlCodec")
            .field("converter", &self.converter)
            .finish()
    }
}

impl<T, U> Codec for XmlCodec<T, U>
where
    T: IntoNode + Send + 'static,
    U: FromNode + Send + 'static,
{
    type Encode = T;
    type Decode = U;

    type Encoder = XmlEncoder<T>;
    type Decoder = XmlDecoder<U>;

    fn encoder(&mut self) -> Self::Encoder {
        XmlEncoder {
            converter: self.converter.clone(),
            _pd: PhantomData,
        }
    }

    fn decoder(&mut self) -> Self::Decoder {
        XmlDecoder {
            converter: self.converter.clone(),
            _pd: PhantomData,
        }
    }
}

/// A [`Encoder`] that knows how to encode `T`.
pub struct XmlEncoder<T> {
    converter: XmlNodeConverter,
    _pd: PhantomData<fn(T)>,
}

impl<T: IntoNode> Encoder for XmlEncoder<T> {
    type Item = T;
    type Error = Status;

    fn encode(&mut self, item: Self::Item, dst: &mut EncodeBuf<'_>) -> Result<(), Self::Error> {
        let name = dst
            .path()
            .last()
            .cloned()
            .ok_or_else(|| Status::operation_failed("output path is empty"))?;

        let node = item.into_node(name);
        dst.extend(self.converter.serialize(&node));

        Ok(())
    }
}

impl<T> fmt::Debug for XmlEncoder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmlEncoder").finish_non_exhaustive()
    }
}

/// A [`Decoder`] that knows how to decode `U`.
pub struct XmlDecoder<U> {
    converter: XmlNodeConverter,
    _pd: PhantomData<fn() -> U>,
}

impl<U: FromNode> Decoder for XmlDecoder<U> {
    type Item = U;
    type Error = Status;

    fn decode(&mut self, src: &mut DecodeBuf<'_>) -> Result<Self::Item, Self::Error> {
        let node = self.converter.deserialize(src.path(), src.element())?;
        U::from_node(node)
    }
}

impl<U> fmt::Debug for XmlDecoder<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmlDecoder").finish_non_exhaustive()
    }
}
