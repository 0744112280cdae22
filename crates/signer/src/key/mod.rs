mod public_key;
mod reference;
mod resolve;

pub use public_key::{PEM_LABEL, PublicKeyPem, rsa_public_key};
pub use reference::{KeyReference, VERSION_LENGTH};
pub use resolve::{VaultKey, resolve};
