//! Display metadata for event kinds and importance levels, plus the sample
//! events shown to a fresh, offline installation.

use chrono::Utc;

use crate::{AccessCode, CalendarEvent, EventId, EventType, Importance, LocalDay};

impl EventType {
    /// Human label shown in lists and pickers
    pub fn label(&self) -> &'static str {
        match self {
            EventType::Birthday => "🎂 Cumpleaños",
            EventType::Anniversary => "💘 Aniversario",
            EventType::Date => "💑 Cita Especial",
            EventType::Trip => "✈️ Viaje",
            EventType::First => "🥇 Primera Vez",
            EventType::Goal => "🏆 Logro",
            EventType::Special => "✨ Día Especial",
            EventType::Memory => "📸 Recuerdo",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            EventType::Birthday => "🎂",
            EventType::Anniversary => "💖",
            EventType::Date => "🍽️",
            EventType::Trip => "🧳",
            EventType::First => "⭐",
            EventType::Goal => "🎯",
            EventType::Special => "🎉",
            EventType::Memory => "📸",
        }
    }

    /// Hex colour, `#RRGGBB`
    pub fn color(&self) -> &'static str {
        match self {
            EventType::Birthday => "#FF6B8B",
            EventType::Anniversary => "#FF3366",
            EventType::Date => "#FF8E53",
            EventType::Trip => "#4F46E5",
            EventType::First => "#10B981",
            EventType::Goal => "#F59E0B",
            EventType::Special => "#8B5CF6",
            EventType::Memory => "#06B6D4",
        }
    }

    /// Closest 256-colour terminal index for [`EventType::color`]
    pub fn ansi_color(&self) -> u8 {
        match self {
            EventType::Birthday => 204,
            EventType::Anniversary => 197,
            EventType::Date => 209,
            EventType::Trip => 62,
            EventType::First => 36,
            EventType::Goal => 214,
            EventType::Special => 99,
            EventType::Memory => 38,
        }
    }
}

impl Importance {
    pub fn label(&self) -> &'static str {
        match self.value() {
            1 => "⭐ Normal",
            2 => "⭐⭐ Importante",
            3 => "⭐⭐⭐ Muy Importante",
            4 => "⭐⭐⭐⭐ Especial",
            _ => "⭐⭐⭐⭐⭐ Inolvidable",
        }
    }

    /// One heart per importance point
    pub fn hearts(&self) -> String {
        "❤️".repeat(self.value() as usize)
    }
}

struct Sample {
    id: &'static str,
    month: u32,
    day: u32,
    title: &'static str,
    description: &'static str,
    event_type: EventType,
    importance: u8,
    repeat_yearly: bool,
    location: &'static str,
}

const SAMPLES: [Sample; 5] = [
    Sample {
        id: "sample_1",
        month: 2,
        day: 14,
        title: "🎂 Cumpleaños Especial",
        description: "Un día muy especial para celebrar",
        event_type: EventType::Birthday,
        importance: 5,
        repeat_yearly: true,
        location: "Lugar favorito",
    },
    Sample {
        id: "sample_2",
        month: 3,
        day: 20,
        title: "💘 Aniversario",
        description: "Celebrando nuestro amor",
        event_type: EventType::Anniversary,
        importance: 5,
        repeat_yearly: true,
        location: "Donde empezó todo",
    },
    Sample {
        id: "sample_3",
        month: 7,
        day: 10,
        title: "✈️ Viaje Romántico",
        description: "Aventuras juntos",
        event_type: EventType::Trip,
        importance: 4,
        repeat_yearly: false,
        location: "Destino especial",
    },
    Sample {
        id: "sample_4",
        month: 1,
        day: 15,
        title: "🥇 Primera Cita",
        description: "El día que todo comenzó",
        event_type: EventType::First,
        importance: 5,
        repeat_yearly: true,
        location: "Cafetería favorita",
    },
    Sample {
        id: "sample_5",
        month: 12,
        day: 25,
        title: "🎉 Día Especial",
        description: "Celebración especial juntos",
        event_type: EventType::Special,
        importance: 4,
        repeat_yearly: true,
        location: "En casa",
    },
];

/// Demonstration events placed in `year` for the given access code.
///
/// They carry [`EventId::Sample`] ids: the repository shows them but never
/// caches, edits or pushes them.
pub fn sample_events(access_code: &AccessCode, year: i32) -> Vec<CalendarEvent> {
    let now = Utc::now();
    SAMPLES
        .iter()
        .filter_map(|sample| {
            let day = LocalDay::from_ymd(year, sample.month, sample.day)?;
            let importance = Importance::try_from(sample.importance).ok()?;
            Some(CalendarEvent {
                id: EventId::Sample(sample.id.to_string()),
                title: sample.title.to_string(),
                description: Some(sample.description.to_string()),
                event_date: day,
                event_type: sample.event_type,
                importance,
                repeat_yearly: sample.repeat_yearly,
                location: Some(sample.location.to_string()),
                gifts: Vec::new(),
                emotions: Vec::new(),
                access_code: access_code.clone(),
                created_by: None,
                created_at: now,
                updated_at: None,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_type_has_distinct_metadata() {
        let mut colors: Vec<&str> = EventType::ALL.iter().map(|t| t.color()).collect();
        colors.sort();
        colors.dedup();
        assert_eq!(colors.len(), EventType::ALL.len());

        for t in EventType::ALL {
            assert!(t.color().starts_with('#') && t.color().len() == 7);
            assert!(!t.label().is_empty());
            assert!(!t.icon().is_empty());
        }
    }

    #[test]
    fn importance_labels_and_hearts() {
        let top = Importance::try_from(5).unwrap();
        assert_eq!(top.label(), "⭐⭐⭐⭐⭐ Inolvidable");
        assert_eq!(top.hearts(), "❤️❤️❤️❤️❤️");
        assert_eq!(Importance::default().label(), "⭐⭐⭐ Muy Importante");
    }

    #[test]
    fn samples_land_in_the_requested_year() {
        let code = AccessCode::new("AMOR2024");
        let samples = sample_events(&code, 2025);
        assert_eq!(samples.len(), 5);
        assert!(samples.iter().all(|e| e.event_date.year() == 2025));
        assert!(samples.iter().all(|e| e.access_code == code && e.id.is_sample()));
        assert_eq!(samples[1].event_type, EventType::Anniversary);
        assert_eq!(samples[1].event_date.to_string(), "2025-03-20");
    }
}
