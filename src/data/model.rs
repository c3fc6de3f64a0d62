use std::collections::{BTreeSet, HashSet};
use std::fmt;

use super::error::DataError;

// ---------------------------------------------------------------------------
// CellValue – a single raw cell read from an input file
// ---------------------------------------------------------------------------

/// A dynamically-typed cell as it comes out of JSON, CSV or Arrow, before it
/// is converted into a typed [`Article`] field.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Null, or text that only spells out a missing value.
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) => {
                let s = s.trim();
                s.is_empty()
                    || s.eq_ignore_ascii_case("nan")
                    || s.eq_ignore_ascii_case("n/a")
                    || s.eq_ignore_ascii_case("null")
            }
            CellValue::Float(v) => v.is_nan(),
            _ => false,
        }
    }

    /// Try to interpret the value as an `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Try to interpret the value as a whole number. Floats must be integral.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i),
            CellValue::Float(v) if v.fract() == 0.0 && v.is_finite() => Some(*v as i64),
            CellValue::Text(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
    }

    /// Render as a categorical label. Integral floats lose their `.0` so
    /// `2020.0` and `2020` land in the same group.
    pub fn as_label(&self) -> Option<String> {
        match self {
            v if v.is_missing() => None,
            CellValue::Text(s) => Some(s.trim().to_string()),
            CellValue::Float(v) if v.fract() == 0.0 && v.is_finite() => {
                Some(format!("{}", *v as i64))
            }
            other => Some(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Field – the columns an article is built from
// ---------------------------------------------------------------------------

/// The input columns of an article record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Id,
    Year,
    Classification,
    EvaluationArea,
    SpecificArea,
    ImpactFactor,
    Internationalized,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Id,
        Field::Year,
        Field::Classification,
        Field::EvaluationArea,
        Field::SpecificArea,
        Field::ImpactFactor,
        Field::Internationalized,
    ];

    /// Accepted column names: the English name first, then the name used by
    /// the Portuguese `artigos.json` exports.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Field::Id => &["id"],
            Field::Year => &["year", "Ano"],
            Field::Classification => &["classification", "Classificação"],
            Field::EvaluationArea => &["evaluation_area", "Área de Avaliação"],
            Field::SpecificArea => &["specific_area", "Área Específica"],
            Field::ImpactFactor => &["impact_factor", "Fator de Impacto"],
            Field::Internationalized => &["internationalized", "Internacionalização"],
        }
    }

    /// Case-insensitive match of a column header against the aliases.
    pub fn matches(self, column: &str) -> bool {
        let column = column.trim().to_lowercase();
        self.aliases().iter().any(|a| a.to_lowercase() == column)
    }

    /// Position of this field's column in a header list.
    pub fn position<S: AsRef<str>>(self, headers: &[S]) -> Option<usize> {
        headers.iter().position(|h| self.matches(h.as_ref()))
    }

    /// Whether the column must exist in the input.
    pub fn is_required(self) -> bool {
        !matches!(self, Field::ImpactFactor)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.aliases()[0])
    }
}

// ---------------------------------------------------------------------------
// Article – one row of the record store
// ---------------------------------------------------------------------------

/// A single published article.
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub id: String,
    pub year: i32,
    /// Qualis tier, e.g. `A1`.
    pub classification: String,
    pub evaluation_area: String,
    pub specific_area: String,
    /// `None` when the venue has no known impact factor.
    pub impact_factor: Option<f64>,
    pub internationalized: String,
}

impl Article {
    /// Build an article from raw cells. `cell` returns the value of a field
    /// for this row (`CellValue::Null` when the column is absent).
    pub fn from_cells<F>(row: usize, mut cell: F) -> Result<Self, DataError>
    where
        F: FnMut(Field) -> CellValue,
    {
        let label = |field: Field, value: CellValue| {
            value
                .as_label()
                .ok_or(DataError::MissingValue { row, field })
        };

        let id = label(Field::Id, cell(Field::Id))?;

        let year_cell = cell(Field::Year);
        if year_cell.is_missing() {
            return Err(DataError::MissingValue {
                row,
                field: Field::Year,
            });
        }
        let year = year_cell
            .as_i64()
            .and_then(|y| i32::try_from(y).ok())
            .ok_or_else(|| DataError::InvalidValue {
                row,
                field: Field::Year,
                value: year_cell.to_string(),
            })?;

        let impact_cell = cell(Field::ImpactFactor);
        let impact_factor = if impact_cell.is_missing() {
            None
        } else {
            match impact_cell.as_f64() {
                Some(v) if v.is_finite() && v >= 0.0 => Some(v),
                _ => {
                    return Err(DataError::InvalidValue {
                        row,
                        field: Field::ImpactFactor,
                        value: impact_cell.to_string(),
                    })
                }
            }
        };

        Ok(Article {
            id,
            year,
            classification: label(Field::Classification, cell(Field::Classification))?,
            evaluation_area: label(Field::EvaluationArea, cell(Field::EvaluationArea))?,
            specific_area: label(Field::SpecificArea, cell(Field::SpecificArea))?,
            impact_factor,
            internationalized: label(Field::Internationalized, cell(Field::Internationalized))?,
        })
    }
}

// ---------------------------------------------------------------------------
// RecordStore – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with the vocabularies of its categorical fields.
/// Never mutated after construction.
#[derive(Debug, Clone)]
pub struct RecordStore {
    articles: Vec<Article>,
    /// Sorted distinct classification values.
    pub classifications: BTreeSet<String>,
    /// Sorted distinct evaluation areas.
    pub evaluation_areas: BTreeSet<String>,
    /// Sorted distinct specific areas.
    pub specific_areas: BTreeSet<String>,
    /// Sorted distinct internationalization labels.
    pub flags: BTreeSet<String>,
    /// Smallest and largest publication year.
    pub year_bounds: (i32, i32),
}

impl RecordStore {
    /// Index the articles. Fails on duplicate ids or an empty dataset.
    pub fn from_articles(articles: Vec<Article>) -> Result<Self, DataError> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(articles.len());
        for a in &articles {
            if !seen.insert(a.id.as_str()) {
                return Err(DataError::DuplicateId(a.id.clone()));
            }
        }

        let first = articles.first().ok_or(DataError::Empty)?;
        let mut year_bounds = (first.year, first.year);
        let mut classifications = BTreeSet::new();
        let mut evaluation_areas = BTreeSet::new();
        let mut specific_areas = BTreeSet::new();
        let mut flags = BTreeSet::new();

        for a in &articles {
            year_bounds.0 = year_bounds.0.min(a.year);
            year_bounds.1 = year_bounds.1.max(a.year);
            classifications.insert(a.classification.clone());
            evaluation_areas.insert(a.evaluation_area.clone());
            specific_areas.insert(a.specific_area.clone());
            flags.insert(a.internationalized.clone());
        }

        Ok(RecordStore {
            articles,
            classifications,
            evaluation_areas,
            specific_areas,
            flags,
            year_bounds,
        })
    }

    /// All articles in load order.
    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    /// Number of articles.
    pub fn len(&self) -> usize {
        self.articles.len()
    }
}

#[cfg(test)]
pub(crate) fn article(
    id: &str,
    year: i32,
    classification: &str,
    area: &str,
    specific: &str,
    impact: Option<f64>,
    flag: &str,
) -> Article {
    Article {
        id: id.to_string(),
        year,
        classification: classification.to_string(),
        evaluation_area: area.to_string(),
        specific_area: specific.to_string(),
        impact_factor: impact,
        internationalized: flag.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: Vec<(Field, CellValue)>) -> impl FnMut(Field) -> CellValue {
        move |f| {
            values
                .iter()
                .find(|(k, _)| *k == f)
                .map(|(_, v)| v.clone())
                .unwrap_or(CellValue::Null)
        }
    }

    fn full_row(impact: CellValue) -> Vec<(Field, CellValue)> {
        vec![
            (Field::Id, CellValue::Integer(7)),
            (Field::Year, CellValue::Float(2021.0)),
            (Field::Classification, CellValue::Text("A1".into())),
            (Field::EvaluationArea, CellValue::Text("Engenharias".into())),
            (Field::SpecificArea, CellValue::Text("Robótica".into())),
            (Field::ImpactFactor, impact),
            (Field::Internationalized, CellValue::Bool(true)),
        ]
    }

    #[test]
    fn builds_article_from_mixed_cells() {
        let a = Article::from_cells(0, cells(full_row(CellValue::Float(2.5)))).unwrap();
        assert_eq!(a.id, "7");
        assert_eq!(a.year, 2021);
        assert_eq!(a.classification, "A1");
        assert_eq!(a.impact_factor, Some(2.5));
        assert_eq!(a.internationalized, "true");
    }

    #[test]
    fn missing_impact_factor_is_none_not_zero() {
        for missing in [
            CellValue::Null,
            CellValue::Float(f64::NAN),
            CellValue::Text(String::new()),
            CellValue::Text("NaN".into()),
        ] {
            let a = Article::from_cells(0, cells(full_row(missing))).unwrap();
            assert_eq!(a.impact_factor, None);
        }
    }

    #[test]
    fn rejects_negative_impact_factor() {
        let err = Article::from_cells(3, cells(full_row(CellValue::Float(-1.0)))).unwrap_err();
        assert!(matches!(
            err,
            DataError::InvalidValue {
                row: 3,
                field: Field::ImpactFactor,
                ..
            }
        ));
    }

    #[test]
    fn rejects_missing_year() {
        let mut row = full_row(CellValue::Null);
        row.retain(|(f, _)| *f != Field::Year);
        let err = Article::from_cells(1, cells(row)).unwrap_err();
        assert_eq!(
            err,
            DataError::MissingValue {
                row: 1,
                field: Field::Year
            }
        );
    }

    #[test]
    fn field_aliases_match_case_insensitively() {
        assert!(Field::Year.matches("ANO"));
        assert!(Field::Id.matches("ID"));
        assert!(Field::EvaluationArea.matches("área de avaliação"));
        assert_eq!(Field::ImpactFactor.position(&["ID", "Fator de Impacto"]), Some(1));
        assert!(!Field::SpecificArea.matches("area"));
    }

    #[test]
    fn store_collects_vocabularies_and_year_bounds() {
        let store = RecordStore::from_articles(vec![
            article("1", 2021, "B1", "Ensino", "Física", None, "Não"),
            article("2", 2019, "A1", "Ensino", "Química", Some(1.0), "Sim"),
            article("3", 2023, "A1", "Engenharias", "Física", Some(2.0), "Não"),
        ])
        .unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(store.year_bounds, (2019, 2023));
        assert_eq!(
            store.classifications.iter().collect::<Vec<_>>(),
            vec!["A1", "B1"]
        );
        assert_eq!(store.evaluation_areas.len(), 2);
        assert_eq!(store.flags.len(), 2);
    }

    #[test]
    fn store_rejects_duplicate_ids_and_empty_input() {
        let dup = RecordStore::from_articles(vec![
            article("1", 2021, "A1", "E", "S", None, "Sim"),
            article("1", 2022, "A2", "E", "S", None, "Sim"),
        ])
        .unwrap_err();
        assert_eq!(dup, DataError::DuplicateId("1".into()));

        assert_eq!(
            RecordStore::from_articles(Vec::new()).unwrap_err(),
            DataError::Empty
        );
    }
}
