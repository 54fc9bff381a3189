// System instructions shared by every HireMatch call.
// Task prompts live next to the feature that sends them (see analysis::prompts).

/// Sent as `systemInstruction` with analysis and auto-fill requests. Replies
/// are parsed verbatim, so anything around the JSON makes the call fail.
pub const JSON_ONLY_SYSTEM: &str = "You are a careful recruiting analyst that answers in JSON. \
    Reply with a single JSON object and nothing else: \
    no markdown fences, no commentary before or after it.";
