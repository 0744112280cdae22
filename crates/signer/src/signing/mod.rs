mod codec;
mod sign;

pub use codec::{Base64UrlCodec, DigestCodec, RawBytesCodec, WireValue};
pub use sign::{SIGN_ALGORITHM, SignResult, sign};
