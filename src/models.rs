use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("field `{0}` must not be empty")]
    MissingField(&'static str),
    #[error("unknown {kind}: {value}")]
    UnknownOption { kind: &'static str, value: String },
}

/// Form enumerations travel as their Japanese labels. Parsing also accepts the
/// short form (the label up to the first `/` or ` (`), e.g. `Tシャツ`.
macro_rules! labelled_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $label:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name { $($variant),+ }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(self) -> &'static str {
                match self { $($name::$variant => $label),+ }
            }

            pub fn parse(input: &str) -> Result<Self, ValidationError> {
                let wanted = input.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.label() == wanted || short_label(v.label()) == wanted)
                    .ok_or_else(|| ValidationError::UnknownOption { kind: $kind, value: input.to_string() })
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.label())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                $name::parse(&raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

fn short_label(label: &str) -> &str {
    let end = [label.find('/'), label.find(" (")]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(label.len());
    &label[..end]
}

labelled_enum!(Category, "category", {
    TShirt => "Tシャツ/カットソー",
    Shirt => "シャツ/ブラウス",
    Knit => "ニット/セーター",
    Hoodie => "パーカー/スウェット",
    Denim => "デニム/ジーンズ",
    Slacks => "スラックス/トラウザー",
    Pants => "チノパン/カーゴパンツ",
    Skirt => "スカート",
    Shorts => "ショートパンツ",
    Jacket => "テーラードジャケット",
    Blouson => "ブルゾン/MA-1",
    Coat => "コート",
    OnePiece => "ワンピース",
    Sneakers => "スニーカー",
    LeatherShoes => "革靴/ブーツ",
    Pumps => "パンプス/サンダル",
    Bag => "バッグ",
    Cap => "帽子/アクセサリー",
});

labelled_enum!(Tone, "tone", {
    Monotone => "無彩色 (白・黒・グレー)",
    Vivid => "原色 (ビビッド)",
    Pastel => "明星色 (パステル/淡い)",
    Grayish => "脱色 (くすみ/グレイッシュ)",
    Dark => "安静色 (ダーク/深み)",
});

labelled_enum!(StyleAttribute, "attribute", {
    Casual => "カジュアル",
    Formal => "フォーマル/きれいめ",
    Street => "ストリート",
    Mode => "モード",
});

labelled_enum!(Silhouette, "silhouette", {
    Tight => "タイト/細身",
    Regular => "レギュラー/標準",
    Oversize => "オーバーサイズ/ビッグシルエット",
    Flare => "フレア/広がり",
});

/// The clothing item the user already owns. Built once per submission via
/// [`ItemDescriptor::validated`] and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDescriptor {
    pub category: Category,
    pub color: String,
    pub tone: Tone,
    pub attribute: StyleAttribute,
    pub design: String,
    pub material: String,
    pub width: String,
    pub length: String,
    pub silhouette: Silhouette,
}

impl ItemDescriptor {
    /// Trims the free-text fields and rejects the descriptor if any is blank.
    pub fn validated(mut self) -> Result<Self, ValidationError> {
        for (name, value) in [
            ("color", &mut self.color),
            ("design", &mut self.design),
            ("material", &mut self.material),
            ("width", &mut self.width),
            ("length", &mut self.length),
        ] {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Err(ValidationError::MissingField(name));
            }
            *value = trimmed.to_string();
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedCoordinate {
    pub title: String,
    pub description: String,
    pub silhouette_theory: String,
    pub color_theory: String,
    pub items: Vec<String>,
    pub visual_prompt: String,
}

impl SuggestedCoordinate {
    /// Prompt handed to the image model, exactly as the text model wrote it.
    pub fn visual_prompt(&self) -> &str {
        &self.visual_prompt
    }
}

#[derive(Debug, Serialize)]
pub struct FormOptions {
    pub categories: Vec<&'static str>,
    pub tones: Vec<&'static str>,
    pub attributes: Vec<&'static str>,
    pub silhouettes: Vec<&'static str>,
    pub colors: &'static [&'static str],
}

impl Default for FormOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl FormOptions {
    pub fn new() -> Self {
        Self {
            categories: Category::ALL.iter().map(|c| c.label()).collect(),
            tones: Tone::ALL.iter().map(|t| t.label()).collect(),
            attributes: StyleAttribute::ALL.iter().map(|a| a.label()).collect(),
            silhouettes: Silhouette::ALL.iter().map(|s| s.label()).collect(),
            colors: crate::manual::COLOR_PALETTE,
        }
    }
}
