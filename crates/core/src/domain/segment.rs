use serde::{Deserialize, Serialize};

/// Data-bearing business segment an operation is routed to via `destino`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Segment {
    #[serde(rename = "COMERCIAL 1")]
    Comercial1,
    #[serde(rename = "COMERCIAL 2")]
    Comercial2,
    #[serde(rename = "INTEGRA CAPITAL")]
    IntegraCapital,
    #[serde(rename = "CAPTACIÓN")]
    Captacion,
    #[serde(rename = "INTERLUDIO")]
    Interludio,
}

impl Segment {
    pub const ALL: [Segment; 5] = [
        Segment::Comercial1,
        Segment::Comercial2,
        Segment::IntegraCapital,
        Segment::Captacion,
        Segment::Interludio,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Comercial1 => "COMERCIAL 1",
            Self::Comercial2 => "COMERCIAL 2",
            Self::IntegraCapital => "INTEGRA CAPITAL",
            Self::Captacion => "CAPTACIÓN",
            Self::Interludio => "INTERLUDIO",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|segment| segment.as_str() == raw.trim())
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Navigation unit of the console: the intake panel, the dashboards, and one
/// entry per data-bearing segment. Only `Segmento` panels filter records.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Panel {
    Inicio,
    Carga,
    Segmento(Segment),
    DashboardGeneral,
}

impl Panel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inicio => "INICIO",
            Self::Carga => "CARGA",
            Self::Segmento(segment) => segment.as_str(),
            Self::DashboardGeneral => "DASHBOARD GENERAL",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "INICIO" => Some(Self::Inicio),
            "CARGA" => Some(Self::Carga),
            "DASHBOARD GENERAL" => Some(Self::DashboardGeneral),
            other => Segment::parse(other).map(Self::Segmento),
        }
    }

    pub fn segment(&self) -> Option<Segment> {
        match self {
            Self::Segmento(segment) => Some(*segment),
            _ => None,
        }
    }
}

impl std::fmt::Display for Panel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Panel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Panel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("unknown panel `{raw}`")))
    }
}

#[cfg(test)]
mod tests {
    use super::{Panel, Segment};

    #[test]
    fn segment_tags_round_trip_through_parse() {
        for segment in Segment::ALL {
            assert_eq!(Segment::parse(segment.as_str()), Some(segment));
        }
        assert_eq!(Segment::parse("COMERCIAL 3"), None);
    }

    #[test]
    fn segment_serializes_to_its_tag() {
        let json = serde_json::to_string(&Segment::Captacion).expect("serialize segment");
        assert_eq!(json, "\"CAPTACIÓN\"");
        let back: Segment = serde_json::from_str(&json).expect("deserialize segment");
        assert_eq!(back, Segment::Captacion);
    }

    #[test]
    fn panel_parse_covers_navigation_and_segments() {
        assert_eq!(Panel::parse("CARGA"), Some(Panel::Carga));
        assert_eq!(Panel::parse("DASHBOARD GENERAL"), Some(Panel::DashboardGeneral));
        assert_eq!(Panel::parse("INTERLUDIO"), Some(Panel::Segmento(Segment::Interludio)));
        assert_eq!(Panel::parse("CONTABILIDAD"), None);
    }

    #[test]
    fn only_segment_panels_expose_a_segment() {
        assert_eq!(Panel::Segmento(Segment::Comercial1).segment(), Some(Segment::Comercial1));
        assert_eq!(Panel::Carga.segment(), None);
        assert_eq!(Panel::Inicio.segment(), None);
    }
}
