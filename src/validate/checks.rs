use crate::{
    domain::{Action, FieldRule, FieldSchema, Record, is_blank, value_to_text},
    form::parse_date,
};

use super::ValidationContext;

/// First failing rule of `field`, evaluated against the whole form so that
/// cross-field rules can see their partner. `title_of` resolves partner
/// labels.
pub(crate) fn check_field(
    field: &FieldSchema,
    values: &Record,
    title_of: &dyn Fn(&str) -> String,
    context: &ValidationContext,
) -> Option<String> {
    let value = values.get(&field.name);
    let blank = is_blank(value);
    if blank {
        return field
            .is_required()
            .then(|| format!("{} is required", field.title));
    }
    let text = value.map(value_to_text).unwrap_or_default();
    let text = text.trim();

    field
        .rules
        .iter()
        .find_map(|rule| check_rule(rule, field, text, values, title_of, context))
}

fn check_rule(
    rule: &FieldRule,
    field: &FieldSchema,
    text: &str,
    values: &Record,
    title_of: &dyn Fn(&str) -> String,
    context: &ValidationContext,
) -> Option<String> {
    let title = &field.title;
    match rule {
        FieldRule::Required => None,
        FieldRule::MinLength(min) => (text.chars().count() < *min)
            .then(|| format!("{title} must be at least {min} characters")),
        FieldRule::MaxLength(max) => (text.chars().count() > *max)
            .then(|| format!("{title} must be at most {max} characters")),
        FieldRule::Pattern(pattern) => {
            (!pattern.is_match(text)).then(|| pattern.message_for(title))
        }
        FieldRule::Range { min, max } => check_range(title, text, *min, *max),
        FieldRule::Before(other) => {
            let this = parse_date(text)?;
            let other_value = values.get(other);
            if is_blank(other_value) {
                return None;
            }
            let that = parse_date(&other_value.map(value_to_text).unwrap_or_default())?;
            (this >= that).then(|| format!("{title} must be earlier than {}", title_of(other)))
        }
        FieldRule::NotPastOnAdd => {
            if !matches!(context.action, Action::Add | Action::Copy) {
                return None;
            }
            let date = parse_date(text)?;
            (date < context.today).then(|| format!("{title} cannot be earlier than today"))
        }
    }
}

fn check_range(title: &str, text: &str, min: Option<f64>, max: Option<f64>) -> Option<String> {
    let Ok(number) = text.parse::<f64>() else {
        return Some(format!("{title} must be a number"));
    };
    let below = min.is_some_and(|min| number < min);
    let above = max.is_some_and(|max| number > max);
    if !below && !above {
        return None;
    }
    Some(match (min, max) {
        (Some(min), Some(max)) => format!(
            "{title} must be between {} and {}",
            format_bound(min),
            format_bound(max)
        ),
        (Some(min), None) => format!("{title} must be at least {}", format_bound(min)),
        (None, Some(max)) => format!("{title} must be at most {}", format_bound(max)),
        (None, None) => return None,
    })
}

fn format_bound(bound: f64) -> String {
    if bound.fract() == 0.0 && bound.abs() < i64::MAX as f64 {
        format!("{}", bound as i64)
    } else {
        bound.to_string()
    }
}
