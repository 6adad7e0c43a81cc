use chrono::prelude::*;
use std::fmt;
use std::str::FromStr;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod fuel;
pub mod memo;
pub mod merge;
pub mod render;
pub mod scrape;
pub mod utils;
pub mod view;

pub use error::DashboardError;
pub use fuel::FuelPrices;
pub use scrape::InflationSeries;

// constants
pub const VERSION: Option<&'static str> = option_env!("CARGO_PKG_VERSION");
pub const INSEE_URL: &str = "https://www.insee.fr/fr/statistiques/8558558#tableau-ipc-g1-fr";
pub const USER_AGENT: &str = "Mozilla/5.0";
pub const DEFAULT_FUEL_CSV: &str = "prix_sp95_nettoye.csv";
pub const SP95_EXPORT_NAME: &str = "donnees_filtrees.csv";
pub const INFLATION_EXPORT_NAME: &str = "inflation_filtree.csv";
pub const COL_DATE: &str = "Date";
pub const COL_PRICE: &str = "Prix";
pub const COL_IPCH: &str = "IPCH";
pub const COL_ISJ: &str = "ISJ";
pub const COL_IPC: &str = "IPC";
pub const NORM_SUFFIX: &str = "_norm";

/// The curves a dashboard can show.
/// The label is what the user selects, the column is where the values live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Measure {
    Sp95,
    Ipc,
    Ipch,
    Isj,
}

impl Measure {
    pub const ALL: [Measure; 4] = [Measure::Sp95, Measure::Ipc, Measure::Ipch, Measure::Isj];
    pub const INFLATION: [Measure; 3] = [Measure::Ipc, Measure::Ipch, Measure::Isj];

    pub fn label(&self) -> &'static str {
        match self {
            Measure::Sp95 => "SP95",
            Measure::Ipc => "IPC",
            Measure::Ipch => "IPCH",
            Measure::Isj => "ISJ",
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Measure::Sp95 => COL_PRICE,
            Measure::Ipc => COL_IPC,
            Measure::Ipch => COL_IPCH,
            Measure::Isj => COL_ISJ,
        }
    }

    /// Name of the derived base-100 column.
    pub fn norm_column(&self) -> String {
        format!("{}{}", self.label(), NORM_SUFFIX)
    }

    /// Column to plot for the current normalize state.
    pub fn plot_column(&self, normalized: bool) -> String {
        if normalized {
            self.norm_column()
        } else {
            self.column().to_owned()
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Measure::Sp95 => {
                "SP95 - prix moyen du litre de sans plomb 95 (€), \
                 lu depuis le fichier local des prix à la pompe."
            }
            Measure::Ipch => {
                "IPCH - Indice des Prix à la Consommation Harmonisé.\n\
                 - Indice européen permettant de comparer l'inflation entre pays de l'UE.\n\
                 - Calculé selon une méthode commune à tous les États membres.\n\
                 - N'inclut pas certains éléments propres à chaque pays (ex : loyers imputés)."
            }
            Measure::Ipc => {
                "IPC - Indice des Prix à la Consommation.\n\
                 - Indice national français, utilisé comme référence officielle.\n\
                 - Mesure l'évolution des prix d'un panier moyen de consommation en France.\n\
                 - Sert à l'indexation des salaires, retraites, loyers, etc."
            }
            Measure::Isj => {
                "ISJ - Indice Spécifique des Jeunes.\n\
                 - Variante de l'IPC adaptée au mode de vie des jeunes de moins de 30 ans.\n\
                 - Panier orienté vers le logement, les transports, la technologie et l'alimentation.\n\
                 - Utile pour comprendre l'impact de l'inflation sur cette tranche d'âge."
            }
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Measure {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SP95" | "PRIX" => Ok(Measure::Sp95),
            "IPC" => Ok(Measure::Ipc),
            "IPCH" => Ok(Measure::Ipch),
            "ISJ" => Ok(Measure::Isj),
            other => Err(format!("unknown curve: {}", other)),
        }
    }
}

/// One named column of a SeriesTable.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

/// The main struct for the monthly series:
/// one date column and any number of named value columns of the same length.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeriesTable {
    pub time: Vec<NaiveDate>,
    pub columns: Vec<Column>,
}

impl SeriesTable {
    pub fn new(time: Vec<NaiveDate>) -> SeriesTable {
        SeriesTable {
            time,
            columns: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| &c.values[..])
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Add a column, replacing any column with the same name in place.
    pub fn set_column<S: Into<String>>(&mut self, name: S, values: Vec<f64>) {
        let name = name.into();
        assert_eq!(
            values.len(),
            self.time.len(),
            "column {} has {} values for {} dates",
            name,
            values.len(),
            self.time.len()
        );
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(c) => c.values = values,
            None => self.columns.push(Column { name, values }),
        }
    }

    /// Keep only the rows whose date satisfies the predicate.
    pub fn retain_rows<F>(&self, keep: F) -> SeriesTable
    where
        F: Fn(&NaiveDate) -> bool,
    {
        let mask: Vec<bool> = self.time.iter().map(keep).collect();
        let time = self
            .time
            .iter()
            .zip(&mask)
            .filter(|(_, k)| **k)
            .map(|(t, _)| *t)
            .collect();
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                values: c
                    .values
                    .iter()
                    .zip(&mask)
                    .filter(|(_, k)| **k)
                    .map(|(v, _)| *v)
                    .collect(),
            })
            .collect();
        SeriesTable { time, columns }
    }

    /// Project onto the given columns, in the given order.
    /// Names without a backing column are skipped.
    pub fn select(&self, names: &[&str]) -> SeriesTable {
        let columns = names
            .iter()
            .filter_map(|n| self.columns.iter().find(|c| c.name == *n).cloned())
            .collect();
        SeriesTable {
            time: self.time.clone(),
            columns,
        }
    }

    /// Distinct years present, ascending.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.time.iter().map(|t| t.year()).collect();
        years.sort_unstable();
        years.dedup();
        years
    }

    /// Dates strictly increasing, i.e. sorted and unique.
    pub fn is_ordered(&self) -> bool {
        self.time.windows(2).all(|w| w[1] > w[0])
    }
}

impl fmt::Display for SeriesTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:>10}", COL_DATE)?;
        for c in self.columns.iter() {
            write!(f, " {:>10}", c.name)?;
        }
        writeln!(f)?;
        for (i, t) in self.time.iter().enumerate() {
            write!(f, "{:>10}", t.format("%Y-%m-%d"))?;
            for c in self.columns.iter() {
                write!(f, " {:>10}", utils::format_value(c.values[i]))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
