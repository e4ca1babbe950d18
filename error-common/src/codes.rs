// Stable error codes carried in HTTP error bodies

pub mod validation {
    pub const INVALID_INPUT: &str = "VALIDATION_1001";
    pub const MISSING_REQUIRED_FIELD: &str = "VALIDATION_1002";
    pub const INVALID_FORMAT: &str = "VALIDATION_1003";
}

pub mod webhook {
    pub const SIGNATURE_MISSING: &str = "WEBHOOK_2001";
    pub const SIGNATURE_MISMATCH: &str = "WEBHOOK_2002";
    pub const INVALID_PAYLOAD: &str = "WEBHOOK_2003";
}

pub mod call_records {
    pub const NOT_FOUND: &str = "CALL_3001";
    pub const ALREADY_EXISTS: &str = "CALL_3002";
}

pub mod storage {
    pub const OPERATION_FAILED: &str = "STORAGE_4001";
}

pub mod external {
    pub const REGISTRY_UNAVAILABLE: &str = "EXTERNAL_5001";
    pub const CONVERSATION_API_FAILED: &str = "EXTERNAL_5002";
}

pub mod internal {
    pub const UNEXPECTED: &str = "INTERNAL_9001";
    pub const CONFIGURATION: &str = "INTERNAL_9002";
}
