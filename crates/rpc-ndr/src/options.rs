//! Decoder configuration

/// Default upper bound on the element count of a single array
pub const DEFAULT_MAX_ARRAY_ELEMENTS: usize = 1 << 20;

/// Order in which deferred referents are decoded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeferralOrder {
    /// Referents found inside a deferred payload join the back of the
    /// current queue
    #[default]
    BreadthFirst,
    /// Each deferred payload drains its own referents before the next
    /// sibling referent is decoded
    DepthFirst,
}

/// Treatment of repeated non-zero referent IDs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReferentAliasing {
    /// Every occurrence is decoded from its own deferred payload
    #[default]
    Independent,
    /// Repeats refer to the first occurrence's payload and consume no bytes
    Shared,
}

/// Options for one decoder
///
/// ```
/// use rpc_ndr::{DecodeOptions, DeferralOrder};
///
/// let options = DecodeOptions::type_serialization()
///     .with_deferral(DeferralOrder::DepthFirst)
///     .with_max_array_elements(4096);
/// assert!(options.top_level_referent);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Skip the referent ID that precedes the top-level value of a type
    /// serialization buffer
    pub top_level_referent: bool,
    pub deferral: DeferralOrder,
    pub aliasing: ReferentAliasing,
    pub max_array_elements: usize,
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self {
            top_level_referent: false,
            deferral: DeferralOrder::default(),
            aliasing: ReferentAliasing::default(),
            max_array_elements: DEFAULT_MAX_ARRAY_ELEMENTS,
        }
    }

    /// Options for MS-RPCE type serialization version 1 buffers such as
    /// Kerberos PAC logon information
    pub fn type_serialization() -> Self {
        Self::new().with_top_level_referent(true)
    }

    pub fn with_top_level_referent(mut self, enabled: bool) -> Self {
        self.top_level_referent = enabled;
        self
    }

    pub fn with_deferral(mut self, deferral: DeferralOrder) -> Self {
        self.deferral = deferral;
        self
    }

    pub fn with_aliasing(mut self, aliasing: ReferentAliasing) -> Self {
        self.aliasing = aliasing;
        self
    }

    pub fn with_max_array_elements(mut self, limit: usize) -> Self {
        self.max_array_elements = limit;
        self
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self::new()
    }
}
