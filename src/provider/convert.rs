//! Conversion between transcript turns and rig-core messages.

use rig::completion::ToolDefinition as RigToolDefinition;
use rig::message::{
    AssistantContent, Message as RigMessage, Text, ToolCall as RigToolCall, ToolFunction,
    ToolResultContent, UserContent,
};
use rig::OneOrMany;
use serde_json::Value;

use crate::tools::ToolDefinition;
use crate::transcript::{ToolInvocationRequest, Turn};

/// Convert the transcript into rig messages, oldest first.
///
/// Consecutive tool outcomes are grouped into one user message so every
/// assistant tool-call message is answered by a single tool-result message.
/// Each outcome replays the ids of the call at the same position, since
/// provider ids are not guaranteed to be unique.
pub(super) fn transcript_to_rig(turns: &[Turn]) -> Vec<RigMessage> {
    let mut messages = Vec::with_capacity(turns.len());
    let mut results: Vec<UserContent> = Vec::new();
    let mut open_calls: &[ToolInvocationRequest] = &[];

    for turn in turns {
        if let Turn::ToolOutcome {
            call_id, outcome, ..
        } = turn
        {
            let content = OneOrMany::one(ToolResultContent::text(outcome.to_model_text()));
            let call = open_calls.get(results.len());
            let id = call.map_or_else(|| call_id.clone(), |c| c.call_id.clone());
            let result = match call.and_then(|c| c.provider_call_id.clone()) {
                Some(provider_call_id) => {
                    UserContent::tool_result_with_call_id(id, provider_call_id, content)
                }
                None => UserContent::tool_result(id, content),
            };
            results.push(result);
            continue;
        }
        flush_results(&mut results, &mut messages);

        match turn {
            Turn::UserText { text } => messages.push(RigMessage::user(text.clone())),
            Turn::ModelText { text } => messages.push(RigMessage::assistant(text.clone())),
            Turn::ModelToolCall { text, calls } => {
                open_calls = calls.as_slice();
                messages.push(assistant_with_calls(text.as_deref(), calls));
            }
            Turn::ToolOutcome { .. } => {}
        }
    }
    flush_results(&mut results, &mut messages);
    messages
}

fn flush_results(results: &mut Vec<UserContent>, messages: &mut Vec<RigMessage>) {
    if results.is_empty() {
        return;
    }
    if let Ok(content) = OneOrMany::many(std::mem::take(results)) {
        messages.push(RigMessage::User { content });
    }
}

fn assistant_with_calls(text: Option<&str>, calls: &[ToolInvocationRequest]) -> RigMessage {
    let mut items: Vec<AssistantContent> = Vec::new();
    if let Some(text) = text.filter(|t| !t.is_empty()) {
        items.push(AssistantContent::Text(Text {
            text: text.to_string(),
        }));
    }
    for call in calls {
        let mut tool_call = RigToolCall::new(
            call.call_id.clone(),
            ToolFunction::new(call.tool_name.clone(), call.arguments.clone()),
        );
        if let Some(ref provider_call_id) = call.provider_call_id {
            tool_call = tool_call.with_call_id(provider_call_id.clone());
        }
        items.push(AssistantContent::ToolCall(tool_call));
    }
    RigMessage::Assistant {
        id: None,
        content: OneOrMany::many(items)
            .unwrap_or_else(|_| OneOrMany::one(AssistantContent::text(""))),
    }
}

/// Tool definitions in rig's shape. The output schema has no slot of its
/// own, so it is appended to the description.
pub(super) fn tools_to_rig(tools: &[ToolDefinition]) -> Vec<RigToolDefinition> {
    tools
        .iter()
        .map(|t| RigToolDefinition {
            name: t.name.clone(),
            description: format!("{}\n\nReturns: {}", t.description, t.output_schema),
            parameters: t.input_schema.clone(),
        })
        .collect()
}

/// Split a provider reply into its text and tool calls.
///
/// Provider ids are kept verbatim. Only a call that arrives with no id at
/// all gets a generated `call_<n>`, chosen not to clash with any id in the
/// same reply.
pub(super) fn split_choice(
    choice: OneOrMany<AssistantContent>,
) -> (Option<String>, Vec<ToolInvocationRequest>) {
    let mut text = String::new();
    let mut calls: Vec<ToolInvocationRequest> = Vec::new();
    let mut raw_calls = Vec::new();

    for item in choice.into_iter() {
        match item {
            AssistantContent::Text(Text { text: t }) => text.push_str(&t),
            AssistantContent::ToolCall(tc) => raw_calls.push(tc),
            _ => {}
        }
    }

    let taken: Vec<String> = raw_calls.iter().map(|tc| tc.id.clone()).collect();
    let mut generated = 0usize;
    for tc in raw_calls {
        let call_id = if tc.id.is_empty() {
            loop {
                let candidate = format!("call_{generated}");
                generated += 1;
                if !taken.contains(&candidate) {
                    break candidate;
                }
            }
        } else {
            tc.id
        };
        calls.push(ToolInvocationRequest {
            call_id,
            provider_call_id: tc.call_id.filter(|c| !c.is_empty()),
            tool_name: tc.function.name,
            arguments: normalize_arguments(tc.function.arguments),
        });
    }

    let text = if text.trim().is_empty() { None } else { Some(text) };
    (text, calls)
}

/// Some providers hand back arguments as a JSON-encoded string.
fn normalize_arguments(arguments: Value) -> Value {
    match arguments {
        Value::String(ref s) => serde_json::from_str(s).unwrap_or(arguments),
        Value::Null => Value::Object(Default::default()),
        other => other,
    }
}
