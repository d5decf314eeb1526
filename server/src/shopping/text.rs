use chrono::NaiveDate;
use db::cart::CartRecipe;

use super::{AggregatedLine, RenderError};

/// Renders the plain-text shopping list. The date is an argument rather
/// than wall-clock so the output is a pure function of its inputs.
pub fn render_text(
    date: NaiveDate,
    lines: &[AggregatedLine],
    recipes: &[CartRecipe],
) -> Result<String, RenderError> {
    if lines.is_empty() && recipes.is_empty() {
        return Err(RenderError::EmptyDocument);
    }

    let mut doc = vec![
        format!("Список покупок (от {}):", date.format("%d.%m.%Y")),
        String::new(),
        "Продукты:".to_string(),
    ];

    doc.extend(lines.iter().enumerate().map(|(n, line)| {
        format!(
            " {:02}.{} - {}{}",
            n + 1,
            capitalize(&line.name),
            line.amount,
            line.measurement_unit,
        )
    }));

    doc.push(String::new());
    doc.push("Рецепты:".to_string());
    doc.extend(
        recipes
            .iter()
            .map(|recipe| format!(" {} ({})", recipe.name, recipe.author)),
    );

    Ok(doc.join("\n"))
}

/// First character uppercased, the rest lowercased.
pub(super) fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(name: &str, unit: &str, amount: i64) -> AggregatedLine {
        AggregatedLine {
            name: name.to_string(),
            measurement_unit: unit.to_string(),
            amount,
        }
    }

    fn recipe(name: &str, author: &str) -> CartRecipe {
        CartRecipe {
            name: name.to_string(),
            author: author.to_string(),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 8).unwrap()
    }

    #[test]
    fn renders_expected_document() {
        let lines = vec![line("картофель", "г", 500), line("соль", "г", 10)];
        let recipes = vec![recipe("Борщ", "Иван Иванов")];

        let rendered = render_text(date(), &lines, &recipes).unwrap();

        assert_eq!(
            rendered,
            "Список покупок (от 08.03.2025):\n\
             \n\
             Продукты:\n\
             \u{20}01.Картофель - 500г\n\
             \u{20}02.Соль - 10г\n\
             \n\
             Рецепты:\n\
             \u{20}Борщ (Иван Иванов)"
        );
    }

    #[test]
    fn rendering_is_idempotent() {
        let lines = vec![line("мука", "г", 250)];
        let recipes = vec![recipe("Блины", "Анна Петрова")];

        let first = render_text(date(), &lines, &recipes).unwrap();
        let second = render_text(date(), &lines, &recipes).unwrap();

        assert_eq!(first.as_bytes(), second.as_bytes());
    }

    #[test]
    fn empty_input_is_refused() {
        let err = render_text(date(), &[], &[]).unwrap_err();

        assert!(matches!(err, RenderError::EmptyDocument));
    }

    #[test]
    fn line_numbers_are_zero_padded() {
        let lines: Vec<AggregatedLine> =
            (0..11).map(|n| line(&format!("i{n:02}"), "г", 1)).collect();

        let rendered = render_text(date(), &lines, &[]).unwrap();

        assert!(rendered.contains(" 01.I00 - 1г"));
        assert!(rendered.contains(" 11.I10 - 1г"));
    }

    #[test]
    fn capitalize_matches_python_semantics() {
        assert_eq!(capitalize("картофель"), "Картофель");
        assert_eq!(capitalize("СОЛЬ"), "Соль");
        assert_eq!(capitalize("sea SALT"), "Sea salt");
        assert_eq!(capitalize(""), "");
    }
}
