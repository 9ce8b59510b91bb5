//! Prompt construction for listing descriptions.

use serde_json::{Map, Value};

/// Target length of one variant, in characters.
pub const VARIANT_MIN_CHARS: usize = 580;
pub const VARIANT_MAX_CHARS: usize = 640;

/// How much of the free-form description is quoted into the prompt.
const REFERENCE_MAX_CHARS: usize = 600;

/// Facts about the listing, as sent by the client in `baseFacts`.
///
/// `structured` wins over `source` when present.
#[derive(Debug, Clone, Default)]
pub struct BaseFacts {
    pub structured: Option<Map<String, Value>>,
    pub source: Option<String>,
}

impl BaseFacts {
    /// Pick the known keys out of an arbitrary `baseFacts` object.
    pub fn from_json(facts: &Map<String, Value>) -> Self {
        let structured = match facts.get("structured") {
            Some(Value::Object(map)) if !map.is_empty() => Some(map.clone()),
            _ => None,
        };
        let source = facts
            .get("source")
            .map(scalar_text)
            .filter(|s| !s.is_empty());
        Self { structured, source }
    }
}

/// Collapse every whitespace run to one space and trim.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Render facts as `key: value; key: value`.
///
/// Arrays render as comma-separated items, nested objects as JSON.
pub fn facts_line(facts: &BaseFacts) -> String {
    match &facts.structured {
        Some(structured) => structured
            .iter()
            .map(|(key, value)| {
                let rendered = match value {
                    Value::Array(items) => items
                        .iter()
                        .map(|item| match item {
                            Value::Object(_) | Value::Array(_) => {
                                collapse_whitespace(&item.to_string())
                            }
                            scalar => collapse_whitespace(&scalar_text(scalar)),
                        })
                        .collect::<Vec<_>>()
                        .join(", "),
                    Value::Object(_) => collapse_whitespace(&value.to_string()),
                    scalar => collapse_whitespace(&scalar_text(scalar)),
                };
                format!("{}: {}", key, rendered)
            })
            .collect::<Vec<_>>()
            .join("; "),
        None => collapse_whitespace(facts.source.as_deref().unwrap_or_default()),
    }
}

/// Build the generation prompt for `n` variants.
pub fn build_prompt(
    facts: &BaseFacts,
    base_description: &str,
    n: usize,
    style_hints: Option<&str>,
) -> String {
    let facts = facts_line(facts);
    let reference: String = collapse_whitespace(base_description)
        .chars()
        .take(REFERENCE_MAX_CHARS)
        .collect();
    let style = style_hints.map(collapse_whitespace).filter(|s| !s.is_empty());

    let mut lines = vec![
        "ВАЖНО: Ответ — только валидный JSON-массив строк, без объектов, без ключей, без пояснений. Пример: [\"...\", \"...\"]".to_string(),
        "Ответ начинается с [ и заканчивается на ].".to_string(),
        format!(
            "Сгенерируй ровно {} уникальных вариантов описания объекта недвижимости на русском языке.",
            n
        ),
    ];

    if !facts.is_empty() {
        lines.push(format!(
            "Факты (единственный источник правды, ничего не выдумывай): {}",
            facts
        ));
    }
    if !reference.is_empty() {
        lines.push(format!(
            "Референс дополнительных фактов, если базовых будет мало: {}",
            reference
        ));
    }

    lines.push(format!(
        "Требования к каждому варианту: {}-{} символов (с пробелами); один абзац без переносов строк; без эмодзи и CAPS; орфография — норма.",
        VARIANT_MIN_CHARS, VARIANT_MAX_CHARS
    ));
    lines.push("Запрещено: добавлять несуществующие детали; менять числа, адреса, площади, цены, сроки; писать оценочные расстояния, виды или сроки, если их нет в фактах; нумеровать варианты.".to_string());
    lines.push("Разнообразие: меняй ракурс (планировка, свет, инфраструктура, сценарии жизни, инвест-логика), синтаксис и лексику; не повторяй целые фразы между вариантами.".to_string());
    if let Some(style) = style {
        lines.push(format!("Тон и стиль: {}.", style));
    }
    lines.push("Если какого-то факта нет — просто опусти его.".to_string());
    lines.push(format!(
        "Перед выводом проверь: длина каждого варианта {}-{}; вариантов ровно {}; все соответствуют фактам; формулировки существенно различаются; внутри строк нет неэкранированных \" или \\.",
        VARIANT_MIN_CHARS, VARIANT_MAX_CHARS, n
    ));
    lines.push("Верни сразу валидный JSON-массив строк без пояснений.".to_string());

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn structured_facts_render_in_insertion_order() {
        let facts = BaseFacts::from_json(&object(json!({
            "structured": {
                "rooms": 2,
                "address": "  ул.   Ленина, 5 ",
                "features": ["балкон", "  лифт  "],
                "area": {"total": 54, "kitchen": 9}
            }
        })));

        assert_eq!(
            facts_line(&facts),
            "rooms: 2; address: ул. Ленина, 5; features: балкон, лифт; area: {\"total\":54,\"kitchen\":9}"
        );
    }

    #[test]
    fn source_is_used_without_structured_facts() {
        let facts = BaseFacts::from_json(&object(json!({
            "source": "Двухкомнатная\n\nквартира   у метро"
        })));
        assert!(facts.structured.is_none());
        assert_eq!(facts_line(&facts), "Двухкомнатная квартира у метро");
    }

    #[test]
    fn empty_structured_object_falls_back_to_source() {
        let facts = BaseFacts::from_json(&object(json!({
            "structured": {},
            "source": "студия"
        })));
        assert_eq!(facts_line(&facts), "студия");
    }

    #[test]
    fn prompt_mentions_count_facts_and_style() {
        let facts = BaseFacts {
            structured: None,
            source: Some("3 комнаты".to_string()),
        };
        let prompt = build_prompt(&facts, "Описание", 4, Some("нейтрально, без воды"));

        assert!(prompt.contains("ровно 4 уникальных"));
        assert!(prompt.contains("Факты (единственный источник правды, ничего не выдумывай): 3 комнаты"));
        assert!(prompt.contains("Референс дополнительных фактов, если базовых будет мало: Описание"));
        assert!(prompt.contains("Тон и стиль: нейтрально, без воды."));
    }

    #[test]
    fn prompt_truncates_reference_and_skips_missing_facts() {
        let long = "а".repeat(1000);
        let prompt = build_prompt(&BaseFacts::default(), &long, 1, None);

        assert!(!prompt.contains("Факты"));
        assert!(!prompt.contains("Тон и стиль"));
        let reference_line = prompt
            .lines()
            .find(|line| line.starts_with("Референс"))
            .unwrap();
        let reference = reference_line.rsplit(": ").next().unwrap();
        assert_eq!(reference.chars().count(), 600);
    }
}
