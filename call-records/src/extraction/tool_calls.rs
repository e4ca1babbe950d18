use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::facts::ExtractedFacts;

/// Which lookup a tool call performed, decided from its name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    Authentication,
    ZipVerification,
    Eligibility,
    Claims,
    PriorAuth,
}

type NamePredicate = fn(&str) -> bool;

fn names_authentication(name: &str) -> bool {
    name.contains("npi") || name.contains("authenticate")
}

fn names_zip_verification(name: &str) -> bool {
    name.contains("zip")
}

fn names_eligibility(name: &str) -> bool {
    name.contains("eligib")
}

fn names_claims(name: &str) -> bool {
    name.contains("claim")
}

fn names_prior_auth(name: &str) -> bool {
    name.contains("prior") || (name.contains("auth") && !name.contains("authenticate"))
}

/// Evaluated top to bottom; the first matching predicate decides the kind
const DISPATCH: &[(ToolKind, NamePredicate)] = &[
    (ToolKind::Authentication, names_authentication),
    (ToolKind::ZipVerification, names_zip_verification),
    (ToolKind::Eligibility, names_eligibility),
    (ToolKind::Claims, names_claims),
    (ToolKind::PriorAuth, names_prior_auth),
];

impl ToolKind {
    pub fn classify(tool_name: &str) -> Option<Self> {
        let name = tool_name.to_lowercase();
        DISPATCH
            .iter()
            .find(|(_, matches)| matches(&name))
            .map(|(kind, _)| *kind)
    }
}

/// One resolved tool call: what was asked and what came back
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub name: String,
    pub params: Value,
    pub result: Value,
}

/// Tool payloads sometimes arrive as JSON text instead of objects
fn decode_embedded(value: Option<&Value>) -> Value {
    match value {
        Some(Value::String(text)) => serde_json::from_str::<Value>(text)
            .ok()
            .filter(Value::is_object)
            .unwrap_or_else(|| Value::Object(Map::new())),
        Some(Value::Object(map)) => Value::Object(map.clone()),
        _ => Value::Object(Map::new()),
    }
}

fn first_present<'a>(object: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| object.get(*key).filter(|v| !v.is_null()))
}

impl ToolInvocation {
    pub fn new(name: impl Into<String>, params: Value, result: Value) -> Self {
        Self {
            name: name.into(),
            params,
            result,
        }
    }

    /// Decode an already-parsed tool call as posted by a browser client
    pub fn from_inline(call: &Value) -> Self {
        let name = first_present(call, &["tool_name", "name"])
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Self {
            name,
            params: decode_embedded(first_present(call, &["params", "arguments"])),
            result: decode_embedded(first_present(call, &["result", "response"])),
        }
    }

    fn param(&self, key: &str) -> Value {
        self.params.get(key).cloned().unwrap_or(Value::Null)
    }

    fn result_field(&self, key: &str) -> Value {
        self.result.get(key).cloned().unwrap_or(Value::Null)
    }

    /// Result value, falling back to the same-named request parameter
    fn result_or_param(&self, key: &str) -> Value {
        match self.result_field(key) {
            Value::Null => self.param(key),
            found => found,
        }
    }
}

/// Tool call entry of a raw vendor transcript
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawToolCall {
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub tool_call_id: Option<String>,
    #[serde(default)]
    pub tool_name: String,
    #[serde(default)]
    pub params_as_json: Option<String>,
}

impl RawToolCall {
    pub fn id(&self) -> Option<&str> {
        self.request_id.as_deref().or(self.tool_call_id.as_deref())
    }
}

/// Tool result entry of a raw vendor transcript
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawToolResult {
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub tool_call_id: Option<String>,
    #[serde(default)]
    pub tool_name: String,
    #[serde(default)]
    pub result_value: Option<Value>,
}

impl RawToolResult {
    pub fn id(&self) -> Option<&str> {
        self.request_id.as_deref().or(self.tool_call_id.as_deref())
    }
}

/// Pairs interleaved tool calls and tool results by their call id.
///
/// A call waits in the pending list until its result arrives. Calls still
/// pending at [`finish`](Self::finish) are emitted with an empty result.
#[derive(Debug, Default)]
pub struct ToolCallPairer {
    pending: Vec<(String, ToolInvocation)>,
    paired: Vec<ToolInvocation>,
}

impl ToolCallPairer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_call(&mut self, call: &RawToolCall) {
        let params = call
            .params_as_json
            .as_ref()
            .map(|text| decode_embedded(Some(&Value::String(text.clone()))))
            .unwrap_or_else(|| Value::Object(Map::new()));
        let invocation = ToolInvocation::new(call.tool_name.clone(), params, Value::Object(Map::new()));

        match call.id() {
            Some(id) => self.pending.push((id.to_string(), invocation)),
            None => self.paired.push(invocation),
        }
    }

    pub fn on_result(&mut self, result: &RawToolResult) {
        let value = decode_embedded(result.result_value.as_ref());
        let position = result
            .id()
            .and_then(|id| self.pending.iter().position(|(pending_id, _)| pending_id == id));

        match position {
            Some(index) => {
                let (_, mut invocation) = self.pending.remove(index);
                invocation.result = value;
                self.paired.push(invocation);
            }
            None => {
                debug!(tool = %result.tool_name, "tool result without a pending call");
                self.paired.push(ToolInvocation::new(
                    result.tool_name.clone(),
                    Value::Object(Map::new()),
                    value,
                ));
            }
        }
    }

    pub fn finish(mut self) -> Vec<ToolInvocation> {
        self.paired
            .extend(self.pending.into_iter().map(|(_, invocation)| invocation));
        self.paired
    }
}

/// Fold tool invocations into flat facts, first writer winning per key
pub fn extract_tool_facts(invocations: &[ToolInvocation], facts: &mut ExtractedFacts) {
    for call in invocations {
        let Some(kind) = ToolKind::classify(&call.name) else {
            debug!(tool = %call.name, "unrecognised tool call ignored");
            continue;
        };

        match kind {
            ToolKind::Authentication => {
                facts.set_default("npi", call.param("npi"));
                facts.set_default("valid", call.result_field("valid"));
                facts.set_default("provider_name", call.result_field("provider_name"));
                facts.set_default("practice_name", call.result_field("practice_name"));
            }
            ToolKind::ZipVerification => {
                facts.set_default("zip_verified", call.result_field("verified"));
                facts.set_default("provider_name", call.result_field("provider_name"));
            }
            ToolKind::Eligibility => {
                facts.set_default("call_intent", Value::from("eligibility"));
                facts.set_default("found", call.result_field("found"));
                for key in ["patient_name", "member_id", "plan_name", "copay_primary", "copay_specialist", "deductible", "deductible_met"] {
                    facts.set_default(key, call.result_field(key));
                }
                facts.set_default("member_status", call.result_field("status"));
                facts.set_default("patient_dob", call.param("patient_dob"));
                if !call.result_field("service_type").is_null() {
                    for key in ["service_type", "service_covered", "service_copay", "service_prior_auth"] {
                        facts.set_default(key, call.result_field(key));
                    }
                }
            }
            ToolKind::Claims => {
                facts.set_default("call_intent", Value::from("claims"));
                facts.set_default("found", call.result_field("found"));
                facts.set_default("claim_number", call.result_or_param("claim_number"));
                facts.set_default("claim_status", call.result_field("status"));
                for key in ["billed_amount", "paid_amount", "patient_responsibility", "denial_code", "denial_reason"] {
                    facts.set_default(key, call.result_field(key));
                }
            }
            ToolKind::PriorAuth => {
                facts.set_default("call_intent", Value::from("prior_auth"));
                facts.set_default("found", call.result_field("found"));
                facts.set_default("pa_id", call.result_or_param("pa_id"));
                facts.set_default("pa_status", call.result_field("status"));
                facts.set_default("service_description", call.result_field("service_description"));
                facts.set_default("denial_reason", call.result_field("denial_reason"));
            }
        }
    }
}
