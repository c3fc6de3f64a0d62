use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

/// One article, serialized with the column names of the `artigos.json` exports.
#[derive(Debug, Serialize)]
struct SampleArticle {
    #[serde(rename = "ID")]
    id: i64,
    #[serde(rename = "Ano")]
    year: i64,
    #[serde(rename = "Classificação")]
    classification: &'static str,
    #[serde(rename = "Área de Avaliação")]
    evaluation_area: &'static str,
    #[serde(rename = "Área Específica")]
    specific_area: &'static str,
    #[serde(rename = "Fator de Impacto")]
    impact_factor: Option<f64>,
    #[serde(rename = "Internacionalização")]
    internationalized: &'static str,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }
}

const CLASSIFICATIONS: [(&str, f64); 8] = [
    ("A1", 6.0),
    ("A2", 4.5),
    ("A3", 3.5),
    ("A4", 2.5),
    ("B1", 1.8),
    ("B2", 1.2),
    ("B3", 0.8),
    ("B4", 0.4),
];

const AREAS: [(&str, &[&str]); 4] = [
    ("Ciência da Computação", &["Inteligência Artificial", "Redes", "Engenharia de Software"]),
    ("Engenharias III", &["Robótica", "Controle e Automação"]),
    ("Ensino", &["Ensino de Física", "Ensino de Química"]),
    ("Medicina I", &["Cardiologia", "Epidemiologia"]),
];

fn generate(n: usize, rng: &mut SimpleRng) -> Vec<SampleArticle> {
    (0..n)
        .map(|i| {
            let &(classification, base_impact) = rng.pick(&CLASSIFICATIONS);
            let &(evaluation_area, specifics) = rng.pick(&AREAS);
            let specific_area = *rng.pick(specifics);
            let year = 2015 + (rng.next_u64() % 10) as i64;
            // About one venue in eight has no known impact factor.
            let impact_factor = (rng.next_f64() >= 0.125)
                .then(|| (base_impact * (0.5 + rng.next_f64()) * 100.0).round() / 100.0);
            let internationalized = if rng.next_f64() < 0.4 { "Sim" } else { "Não" };

            SampleArticle {
                id: i as i64 + 1,
                year,
                classification,
                evaluation_area,
                specific_area,
                impact_factor,
                internationalized,
            }
        })
        .collect()
}

fn write_json(path: &str, articles: &[SampleArticle]) -> Result<()> {
    let text = serde_json::to_string_pretty(articles).context("serializing articles")?;
    std::fs::write(path, text).with_context(|| format!("writing {path}"))
}

fn write_parquet(path: &str, articles: &[SampleArticle]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("ID", DataType::Int64, false),
        Field::new("Ano", DataType::Int64, false),
        Field::new("Classificação", DataType::Utf8, false),
        Field::new("Área de Avaliação", DataType::Utf8, false),
        Field::new("Área Específica", DataType::Utf8, false),
        Field::new("Fator de Impacto", DataType::Float64, true),
        Field::new("Internacionalização", DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from_iter_values(articles.iter().map(|a| a.id))),
            Arc::new(Int64Array::from_iter_values(articles.iter().map(|a| a.year))),
            Arc::new(StringArray::from_iter_values(articles.iter().map(|a| a.classification))),
            Arc::new(StringArray::from_iter_values(articles.iter().map(|a| a.evaluation_area))),
            Arc::new(StringArray::from_iter_values(articles.iter().map(|a| a.specific_area))),
            Arc::new(Float64Array::from_iter(articles.iter().map(|a| a.impact_factor))),
            Arc::new(StringArray::from_iter_values(articles.iter().map(|a| a.internationalized))),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let articles = generate(600, &mut rng);

    write_json("artigos.json", &articles)?;
    write_parquet("artigos.parquet", &articles)?;

    println!(
        "Wrote {} articles to artigos.json and artigos.parquet",
        articles.len()
    );
    Ok(())
}
