//! Digest functions: md5(), sha1(), hash() and hash_hmac()

use std::sync::LazyLock;

use hmac::{Hmac, Mac};
use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};

use crate::model::{TypeInfo, Value};
use crate::registry::function::{
    FunctionContext, FunctionError, FunctionRegistry, FunctionResult, HostFunction,
};
use crate::registry::functions::{bytes_arg, flag_arg, string_arg};
use crate::registry::signature::{FunctionSignature, ParameterInfo};

/// Supported digest algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    /// MD5
    Md5,
    /// SHA-1
    Sha1,
    /// SHA-224
    Sha224,
    /// SHA-256
    Sha256,
    /// SHA-384
    Sha384,
    /// SHA-512
    Sha512,
}

impl DigestAlgorithm {
    /// Resolve an algorithm name, case-insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "md5" => Some(Self::Md5),
            "sha1" => Some(Self::Sha1),
            "sha224" => Some(Self::Sha224),
            "sha256" => Some(Self::Sha256),
            "sha384" => Some(Self::Sha384),
            "sha512" => Some(Self::Sha512),
            _ => None,
        }
    }

    /// Digest of `data`
    pub fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::Md5 => <Md5 as Digest>::digest(data).to_vec(),
            Self::Sha1 => <Sha1 as Digest>::digest(data).to_vec(),
            Self::Sha224 => <Sha224 as Digest>::digest(data).to_vec(),
            Self::Sha256 => <Sha256 as Digest>::digest(data).to_vec(),
            Self::Sha384 => <Sha384 as Digest>::digest(data).to_vec(),
            Self::Sha512 => <Sha512 as Digest>::digest(data).to_vec(),
        }
    }

    /// Keyed HMAC of `data`
    pub fn hmac(self, key: &[u8], data: &[u8]) -> Result<Vec<u8>, hmac::digest::InvalidLength> {
        macro_rules! mac {
            ($hash:ty) => {{
                let mut mac = <Hmac<$hash> as Mac>::new_from_slice(key)?;
                Mac::update(&mut mac, data);
                Ok(Mac::finalize(mac).into_bytes().to_vec())
            }};
        }

        match self {
            Self::Md5 => mac!(Md5),
            Self::Sha1 => mac!(Sha1),
            Self::Sha224 => mac!(Sha224),
            Self::Sha256 => mac!(Sha256),
            Self::Sha384 => mac!(Sha384),
            Self::Sha512 => mac!(Sha512),
        }
    }
}

/// Lowercase hex digest, or the raw bytes when `binary` is set
fn digest_output(bytes: Vec<u8>, binary: bool) -> Value {
    if binary {
        Value::Bytes(bytes)
    } else {
        Value::String(hex::encode(bytes))
    }
}

fn resolve_algorithm(name: &str, algo: &str) -> FunctionResult<DigestAlgorithm> {
    DigestAlgorithm::from_name(algo).ok_or_else(|| {
        FunctionError::evaluation(
            name,
            "Argument #1 ($algo) must be a valid hashing algorithm",
        )
    })
}

/// md5() function - MD5 digest of a string
pub struct Md5Function;

impl HostFunction for Md5Function {
    fn name(&self) -> &str {
        "md5"
    }

    fn signature(&self) -> &FunctionSignature {
        static SIG: LazyLock<FunctionSignature> = LazyLock::new(|| {
            FunctionSignature::new(
                "md5",
                vec![
                    ParameterInfo::required("string", TypeInfo::String),
                    ParameterInfo::optional("binary", TypeInfo::Boolean),
                ],
                TypeInfo::String,
            )
        });
        &SIG
    }

    fn documentation(&self) -> &str {
        "Calculates the MD5 hash of a string as 32 hex characters, or 16 raw bytes when binary is true."
    }

    fn is_pure(&self) -> bool {
        true
    }

    fn evaluate(&self, args: &[Value], _context: &FunctionContext) -> FunctionResult<Value> {
        self.validate_args(args)?;
        let data = bytes_arg(self.name(), args, 0, "string")?;
        Ok(digest_output(
            DigestAlgorithm::Md5.digest(&data),
            flag_arg(args, 1),
        ))
    }
}

/// sha1() function - SHA-1 digest of a string
pub struct Sha1Function;

impl HostFunction for Sha1Function {
    fn name(&self) -> &str {
        "sha1"
    }

    fn signature(&self) -> &FunctionSignature {
        static SIG: LazyLock<FunctionSignature> = LazyLock::new(|| {
            FunctionSignature::new(
                "sha1",
                vec![
                    ParameterInfo::required("string", TypeInfo::String),
                    ParameterInfo::optional("binary", TypeInfo::Boolean),
                ],
                TypeInfo::String,
            )
        });
        &SIG
    }

    fn documentation(&self) -> &str {
        "Calculates the SHA-1 hash of a string as 40 hex characters, or 20 raw bytes when binary is true."
    }

    fn is_pure(&self) -> bool {
        true
    }

    fn evaluate(&self, args: &[Value], _context: &FunctionContext) -> FunctionResult<Value> {
        self.validate_args(args)?;
        let data = bytes_arg(self.name(), args, 0, "string")?;
        Ok(digest_output(
            DigestAlgorithm::Sha1.digest(&data),
            flag_arg(args, 1),
        ))
    }
}

/// hash() function - digest with a named algorithm
pub struct HashFunction;

impl HostFunction for HashFunction {
    fn name(&self) -> &str {
        "hash"
    }

    fn signature(&self) -> &FunctionSignature {
        static SIG: LazyLock<FunctionSignature> = LazyLock::new(|| {
            FunctionSignature::new(
                "hash",
                vec![
                    ParameterInfo::required("algo", TypeInfo::String),
                    ParameterInfo::required("data", TypeInfo::String),
                    ParameterInfo::optional("binary", TypeInfo::Boolean),
                ],
                TypeInfo::String,
            )
        });
        &SIG
    }

    fn documentation(&self) -> &str {
        "Generates a hash value using md5, sha1, sha224, sha256, sha384 or sha512."
    }

    fn is_pure(&self) -> bool {
        true
    }

    fn evaluate(&self, args: &[Value], _context: &FunctionContext) -> FunctionResult<Value> {
        self.validate_args(args)?;
        let algo = string_arg(self.name(), args, 0, "algo")?;
        let algorithm = resolve_algorithm(self.name(), &algo)?;
        let data = bytes_arg(self.name(), args, 1, "data")?;
        Ok(digest_output(algorithm.digest(&data), flag_arg(args, 2)))
    }
}

/// hash_hmac() function - keyed digest with a named algorithm
pub struct HashHmacFunction;

impl HostFunction for HashHmacFunction {
    fn name(&self) -> &str {
        "hash_hmac"
    }

    fn signature(&self) -> &FunctionSignature {
        static SIG: LazyLock<FunctionSignature> = LazyLock::new(|| {
            FunctionSignature::new(
                "hash_hmac",
                vec![
                    ParameterInfo::required("algo", TypeInfo::String),
                    ParameterInfo::required("data", TypeInfo::String),
                    ParameterInfo::required("key", TypeInfo::String),
                    ParameterInfo::optional("binary", TypeInfo::Boolean),
                ],
                TypeInfo::String,
            )
        });
        &SIG
    }

    fn documentation(&self) -> &str {
        "Generates a keyed hash value using the HMAC method."
    }

    fn is_pure(&self) -> bool {
        true
    }

    fn evaluate(&self, args: &[Value], _context: &FunctionContext) -> FunctionResult<Value> {
        self.validate_args(args)?;
        let algo = string_arg(self.name(), args, 0, "algo")?;
        let algorithm = resolve_algorithm(self.name(), &algo)?;
        let data = bytes_arg(self.name(), args, 1, "data")?;
        let key = bytes_arg(self.name(), args, 2, "key")?;
        let mac = algorithm
            .hmac(&key, &data)
            .map_err(|e| FunctionError::evaluation(self.name(), e.to_string()))?;
        Ok(digest_output(mac, flag_arg(args, 3)))
    }
}

/// Register all digest functions
pub fn register_digest_functions(registry: &mut FunctionRegistry) {
    registry.register(Md5Function);
    registry.register(Sha1Function);
    registry.register(HashFunction);
    registry.register(HashHmacFunction);
}
