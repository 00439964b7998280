// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

const TYPE_SUFFIXES: [&str; 2] = ["__c", "__r"];

/// Turns a raw field identifier such as `Account_Type__c` into `Account Type`.
pub fn format_label(raw: &str) -> String {
    let spaced = strip_type_suffix(raw).replace('_', " ");
    split_camel_case(&spaced)
        .split_whitespace()
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_type_suffix(raw: &str) -> &str {
    let Some(split) = raw.len().checked_sub(3) else {
        return raw;
    };
    match (raw.get(..split), raw.get(split..)) {
        (Some(head), Some(tail))
            if TYPE_SUFFIXES
                .iter()
                .any(|suffix| tail.eq_ignore_ascii_case(suffix)) =>
        {
            head
        }
        _ => raw,
    }
}

fn split_camel_case(value: &str) -> String {
    let mut output = String::with_capacity(value.len() + 4);
    let mut previous: Option<char> = None;
    for ch in value.chars() {
        if let Some(prev) = previous
            && prev.is_ascii_lowercase()
            && ch.is_ascii_uppercase()
        {
            output.push(' ');
        }
        output.push(ch);
        previous = Some(ch);
    }
    output
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
