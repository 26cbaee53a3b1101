/// LDAP result codes, server side (RFC 4511) and the client-side codes the
/// native client libraries report for local failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ResultCode {
    Success = 0x00,
    OperationsError = 0x01,
    ProtocolError = 0x02,
    TimeLimitExceeded = 0x03,
    SizeLimitExceeded = 0x04,
    CompareFalse = 0x05,
    CompareTrue = 0x06,
    AuthMethodNotSupported = 0x07,
    StrongerAuthRequired = 0x08,
    Referral = 0x0a,
    AdminLimitExceeded = 0x0b,
    UnavailableCriticalExtension = 0x0c,
    ConfidentialityRequired = 0x0d,
    SaslBindInProgress = 0x0e,
    NoSuchAttribute = 0x10,
    UndefinedAttributeType = 0x11,
    InappropriateMatching = 0x12,
    ConstraintViolation = 0x13,
    AttributeOrValueExists = 0x14,
    InvalidAttributeSyntax = 0x15,
    NoSuchObject = 0x20,
    AliasProblem = 0x21,
    InvalidDnSyntax = 0x22,
    AliasDereferencingProblem = 0x24,
    InappropriateAuthentication = 0x30,
    InvalidCredentials = 0x31,
    InsufficientAccessRights = 0x32,
    Busy = 0x33,
    Unavailable = 0x34,
    UnwillingToPerform = 0x35,
    LoopDetect = 0x36,
    NamingViolation = 0x40,
    ObjectClassViolation = 0x41,
    NotAllowedOnNonLeaf = 0x42,
    NotAllowedOnRdn = 0x43,
    EntryAlreadyExists = 0x44,
    ObjectClassModsProhibited = 0x45,
    AffectsMultipleDsas = 0x47,
    Other = 0x50,
    ServerDown = 0x51,
    LocalError = 0x52,
    EncodingError = 0x53,
    DecodingError = 0x54,
    Timeout = 0x55,
    AuthUnknown = 0x56,
    FilterError = 0x57,
    UserCancelled = 0x58,
    ParamError = 0x59,
    NoMemory = 0x5a,
    ConnectError = 0x5b,
    NotSupported = 0x5c,
    ControlNotFound = 0x5d,
    NoResultsReturned = 0x5e,
    MoreResultsToReturn = 0x5f,
    ClientLoop = 0x60,
    ReferralLimitExceeded = 0x61,
}

const ALL: &[ResultCode] = &[
    ResultCode::Success,
    ResultCode::OperationsError,
    ResultCode::ProtocolError,
    ResultCode::TimeLimitExceeded,
    ResultCode::SizeLimitExceeded,
    ResultCode::CompareFalse,
    ResultCode::CompareTrue,
    ResultCode::AuthMethodNotSupported,
    ResultCode::StrongerAuthRequired,
    ResultCode::Referral,
    ResultCode::AdminLimitExceeded,
    ResultCode::UnavailableCriticalExtension,
    ResultCode::ConfidentialityRequired,
    ResultCode::SaslBindInProgress,
    ResultCode::NoSuchAttribute,
    ResultCode::UndefinedAttributeType,
    ResultCode::InappropriateMatching,
    ResultCode::ConstraintViolation,
    ResultCode::AttributeOrValueExists,
    ResultCode::InvalidAttributeSyntax,
    ResultCode::NoSuchObject,
    ResultCode::AliasProblem,
    ResultCode::InvalidDnSyntax,
    ResultCode::AliasDereferencingProblem,
    ResultCode::InappropriateAuthentication,
    ResultCode::InvalidCredentials,
    ResultCode::InsufficientAccessRights,
    ResultCode::Busy,
    ResultCode::Unavailable,
    ResultCode::UnwillingToPerform,
    ResultCode::LoopDetect,
    ResultCode::NamingViolation,
    ResultCode::ObjectClassViolation,
    ResultCode::NotAllowedOnNonLeaf,
    ResultCode::NotAllowedOnRdn,
    ResultCode::EntryAlreadyExists,
    ResultCode::ObjectClassModsProhibited,
    ResultCode::AffectsMultipleDsas,
    ResultCode::Other,
    ResultCode::ServerDown,
    ResultCode::LocalError,
    ResultCode::EncodingError,
    ResultCode::DecodingError,
    ResultCode::Timeout,
    ResultCode::AuthUnknown,
    ResultCode::FilterError,
    ResultCode::UserCancelled,
    ResultCode::ParamError,
    ResultCode::NoMemory,
    ResultCode::ConnectError,
    ResultCode::NotSupported,
    ResultCode::ControlNotFound,
    ResultCode::NoResultsReturned,
    ResultCode::MoreResultsToReturn,
    ResultCode::ClientLoop,
    ResultCode::ReferralLimitExceeded,
];

impl ResultCode {
    pub fn from_u32(code: u32) -> Option<Self> {
        ALL.iter().copied().find(|c| *c as u32 == code)
    }

    /// Wording used by the native client library for this code.
    pub fn description(self) -> &'static str {
        match self {
            ResultCode::Success => "Success",
            ResultCode::OperationsError => "Operations error",
            ResultCode::ProtocolError => "Protocol error",
            ResultCode::TimeLimitExceeded => "Time limit exceeded",
            ResultCode::SizeLimitExceeded => "Size limit exceeded",
            ResultCode::CompareFalse => "Compare False",
            ResultCode::CompareTrue => "Compare True",
            ResultCode::AuthMethodNotSupported => "Authentication method not supported",
            ResultCode::StrongerAuthRequired => "Strong(er) authentication required",
            ResultCode::Referral => "Referral",
            ResultCode::AdminLimitExceeded => "Administrative limit exceeded",
            ResultCode::UnavailableCriticalExtension => "Critical extension is unavailable",
            ResultCode::ConfidentialityRequired => "Confidentiality required",
            ResultCode::SaslBindInProgress => "SASL bind in progress",
            ResultCode::NoSuchAttribute => "No such attribute",
            ResultCode::UndefinedAttributeType => "Undefined attribute type",
            ResultCode::InappropriateMatching => "Inappropriate matching",
            ResultCode::ConstraintViolation => "Constraint violation",
            ResultCode::AttributeOrValueExists => "Type or value exists",
            ResultCode::InvalidAttributeSyntax => "Invalid syntax",
            ResultCode::NoSuchObject => "No such object",
            ResultCode::AliasProblem => "Alias problem",
            ResultCode::InvalidDnSyntax => "Invalid DN syntax",
            ResultCode::AliasDereferencingProblem => "Alias dereferencing problem",
            ResultCode::InappropriateAuthentication => "Inappropriate authentication",
            ResultCode::InvalidCredentials => "Invalid credentials",
            ResultCode::InsufficientAccessRights => "Insufficient access",
            ResultCode::Busy => "Server is busy",
            ResultCode::Unavailable => "Server is unavailable",
            ResultCode::UnwillingToPerform => "Server is unwilling to perform",
            ResultCode::LoopDetect => "Loop detected",
            ResultCode::NamingViolation => "Naming violation",
            ResultCode::ObjectClassViolation => "Object class violation",
            ResultCode::NotAllowedOnNonLeaf => "Operation not allowed on non-leaf",
            ResultCode::NotAllowedOnRdn => "Operation not allowed on RDN",
            ResultCode::EntryAlreadyExists => "Already exists",
            ResultCode::ObjectClassModsProhibited => "Cannot modify object class",
            ResultCode::AffectsMultipleDsas => "Operation affects multiple DSAs",
            ResultCode::Other => "Other (e.g., implementation specific) error",
            ResultCode::ServerDown => "Can't contact LDAP server",
            ResultCode::LocalError => "Local error",
            ResultCode::EncodingError => "Encoding error",
            ResultCode::DecodingError => "Decoding error",
            ResultCode::Timeout => "Timed out",
            ResultCode::AuthUnknown => "Unknown authentication method",
            ResultCode::FilterError => "Bad search filter",
            ResultCode::UserCancelled => "User cancelled operation",
            ResultCode::ParamError => "Bad parameter to an ldap routine",
            ResultCode::NoMemory => "Out of memory",
            ResultCode::ConnectError => "Connect error",
            ResultCode::NotSupported => "Not Supported",
            ResultCode::ControlNotFound => "Control not found",
            ResultCode::NoResultsReturned => "No results returned",
            ResultCode::MoreResultsToReturn => "More results to return",
            ResultCode::ClientLoop => "Client Loop",
            ResultCode::ReferralLimitExceeded => "Referral Limit Exceeded",
        }
    }
}

pub fn describe(code: u32) -> &'static str {
    ResultCode::from_u32(code)
        .map(ResultCode::description)
        .unwrap_or("Unknown error")
}
