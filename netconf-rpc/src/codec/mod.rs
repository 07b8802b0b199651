//! Generic encoding and decoding.
//!
//! This module contains the generic `Codec`, `Encoder` and `Decoder` traits,
//! the schema-addressed [`XmlNodeConverter`] and the [`XmlCodec`] that binds
//! typed operation input and output to it.

mod binding;
mod buffer;
mod converter;

#[cfg(test)]
mod tests;

pub use self::binding::{FromNode, IntoNode, NodeCodec, XmlCodec, XmlDecoder, XmlEncoder};
pub use self::buffer::{DecodeBuf, EncodeBuf};
pub use self::converter::XmlNodeConverter;

use crate::Status;

/// Trait that knows how to encode and decode operation payloads.
pub trait Codec {
    /// The encodable output type.
    type Encode: Send + 'static;
    /// The decodable input type.
    type Decode: Send + 'static;

    /// The encoder that can encode an output.
    type Encoder: Encoder<Item = Self::Encode, Error = Status> + Send + 'static;
    /// The decoder that can decode an input.
    type Decoder: Decoder<Item = Self::Decode, Error = Status> + Send + 'static;

    /// Fetch the encoder.
    fn encoder(&mut self) -> Self::Encoder;
    /// Fetch the decoder.
    fn decoder(&mut self) -> Self::Decoder;
}

/// Encodes operation output.
pub trait Encoder {
    /// The type that is encoded.
    type Item;

    /// The type of encoding errors.
    type Error;

    /// Encodes an output into the provided buffer.
    fn encode(&mut self, item: Self::Item, dst: &mut EncodeBuf<'_>) -> Result<(), Self::Error>;
}

/// Decodes operation input.
pub trait Decoder {
    /// The type that is decoded.
    type Item;

    /// The type of decoding errors.
    type Error;

    /// Decode an input from the buffer.
    ///
    /// The buffer holds exactly the element carrying the operation input and
    /// the absolute schema path it must conform to.
    fn decode(&mut self, src: &mut DecodeBuf<'_>) -> Result<Self::Item, Self::Error>;
}
