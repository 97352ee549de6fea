use crate::{model::Recommendation, theme::RenderSettings};

use super::PanelContent;

pub const EMPTY_MESSAGE: &str = "No travel recommendations available at the moment.";

pub fn build(recommendations: &[Recommendation], settings: &RenderSettings) -> PanelContent {
    if recommendations.is_empty() {
        return PanelContent::new(settings).line(EMPTY_MESSAGE);
    }

    recommendations.iter().fold(PanelContent::new(settings), |content, item| {
        let content = content.line(format!("🌤️ {}", item.city)).line(format!("   {}", item.reason));

        let content = match item.conditions() {
            Some((temperature, humidity)) => {
                content.line(format!("   {temperature}°C · {humidity}% Humidity"))
            }
            None => content,
        };

        match item.score {
            Some(score) => content.line(format!("   Score: {score}")),
            None => content,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_shows_placeholder() {
        let content = build(&[], &RenderSettings::default());
        assert_eq!(content.lines, vec![EMPTY_MESSAGE]);
        assert!(content.charts.is_empty());
    }

    #[test]
    fn each_recommendation_gets_a_block() {
        let recs = vec![
            Recommendation {
                city: "Jaipur".into(),
                reason: "Current temperature: 27°C, Weather: clear".into(),
                temperature: Some(27.0),
                humidity: Some(30.0),
                score: Some(5.0),
            },
            Recommendation {
                city: "Delhi".into(),
                reason: "Current temperature: 33.5°C, Weather: haze".into(),
                temperature: Some(33.5),
                humidity: Some(45.0),
                score: None,
            },
        ];

        let content = build(&recs, &RenderSettings::default());
        assert_eq!(content.lines.len(), 7);
        assert_eq!(content.lines[0], "🌤️ Jaipur");
        assert_eq!(content.lines[2], "   27°C · 30% Humidity");
        assert_eq!(content.lines[3], "   Score: 5");
        assert_eq!(content.lines[6], "   33.5°C · 45% Humidity");
    }

    #[test]
    fn score_only_entries_skip_conditions() {
        let recs = vec![Recommendation {
            city: "Dehradun".into(),
            reason: "Current temperature: 24.1°C, Weather: clear".into(),
            temperature: None,
            humidity: None,
            score: Some(5.0),
        }];

        let content = build(&recs, &RenderSettings::default());
        assert_eq!(
            content.lines,
            vec![
                "🌤️ Dehradun",
                "   Current temperature: 24.1°C, Weather: clear",
                "   Score: 5",
            ]
        );
    }
}
