//! Command-line front end: print one person, export batches to files, or
//! validate a CPF.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use gerador_dados_br::address::AddressResolver;
use gerador_dados_br::cep_client::HttpCepLookup;
use gerador_dados_br::config::Config;
use gerador_dados_br::cpf;
use gerador_dados_br::export::{self, ExportFormat};
use gerador_dados_br::identity::PersonGenerator;
use std::path::PathBuf;
use std::sync::Arc;

/// Batches above this size need explicit confirmation.
const LARGE_BATCH: usize = 1000;

/// Prefix of files written by the exporter.
const FILE_PREFIX: &str = "dados_gerados";

#[derive(Parser)]
#[command(
    name = "gerador",
    version,
    about = "Gerador de dados pessoais brasileiros fictícios"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Gera 1 pessoa e exibe no console
    Pessoa,
    /// Gera múltiplas pessoas e exporta para Excel e/ou CSV
    Exportar {
        /// Quantas pessoas gerar
        #[arg(short, long)]
        quantidade: usize,
        /// Formato do arquivo
        #[arg(short, long, value_enum, default_value_t = Formato::Ambos)]
        formato: Formato,
        /// Diretório de saída (padrão: OUTPUT_DIR ou dados_gerados)
        #[arg(short, long)]
        saida: Option<PathBuf>,
        /// Confirma lotes com mais de 1000 pessoas
        #[arg(long)]
        sim: bool,
    },
    /// Valida um CPF (com ou sem pontuação)
    Validar { cpf: String },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Formato {
    Excel,
    Csv,
    Ambos,
}

impl Formato {
    fn formats(self) -> Vec<ExportFormat> {
        match self {
            Formato::Excel => vec![ExportFormat::Xlsx],
            Formato::Csv => vec![ExportFormat::Csv],
            Formato::Ambos => vec![ExportFormat::Xlsx, ExportFormat::Csv],
        }
    }
}

fn person_generator(config: &Config) -> anyhow::Result<PersonGenerator> {
    let lookup = HttpCepLookup::new(config.cep_endpoints())?;
    let resolver = AddressResolver::new(Arc::new(lookup))
        .with_max_attempts(config.cep_max_attempts)
        .with_timeout(config.cep_lookup_timeout());
    Ok(PersonGenerator::new(resolver))
}

/// Verdict line for `validar`; an invalid CPF is an error so the exit code is 1.
fn cpf_verdict(input: &str) -> anyhow::Result<String> {
    match cpf::validate(input) {
        Ok(clean) => Ok(format!("{}: CPF válido", cpf::format(&clean))),
        Err(reason) => Err(anyhow::anyhow!("{}: {}", input, reason)),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gerador_dados_br=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Command::Pessoa => {
            let generator = person_generator(&config)?;
            let person = generator.generate().await;
            println!("{}", serde_json::to_string_pretty(&person)?);
        }
        Command::Exportar {
            quantidade,
            formato,
            saida,
            sim,
        } => {
            if quantidade == 0 {
                anyhow::bail!("Quantidade deve ser maior que zero");
            }
            if quantidade > LARGE_BATCH && !sim {
                anyhow::bail!(
                    "Gerar {} pessoas pode demorar. Repita com --sim para confirmar",
                    quantidade
                );
            }

            let generator = person_generator(&config)?;
            let people = generator.generate_many(quantidade).await;
            let rows = people
                .iter()
                .map(|p| p.to_flat_row())
                .collect::<Result<Vec<_>, _>>()
                .context("Failed to flatten generated people")?;

            let dir = saida.unwrap_or_else(|| PathBuf::from(&config.output_dir));
            let now = chrono::Local::now();
            for format in formato.formats() {
                let bytes = format.render(&rows)?;
                let name = export::timestamped_filename(FILE_PREFIX, format, &now);
                let path = export::write_to_dir(&dir, &name, &bytes)?;
                println!("Arquivo criado: {}", path.display());
            }
        }
        Command::Validar { cpf: input } => {
            println!("{}", cpf_verdict(&input)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpf_verdict() {
        assert_eq!(
            cpf_verdict("52998224725").unwrap(),
            "529.982.247-25: CPF válido"
        );

        let err = cpf_verdict("111.111.111-11").unwrap_err();
        assert_eq!(
            err.to_string(),
            "111.111.111-11: CPF inválido (todos os dígitos iguais)"
        );
    }

    #[test]
    fn test_cli_parses_export_options() {
        let cli = Cli::try_parse_from([
            "gerador",
            "exportar",
            "--quantidade",
            "5",
            "--formato",
            "csv",
        ])
        .unwrap();
        match cli.command {
            Command::Exportar {
                quantidade,
                formato,
                saida,
                sim,
            } => {
                assert_eq!(quantidade, 5);
                assert_eq!(formato.formats(), vec![ExportFormat::Csv]);
                assert_eq!(saida, None);
                assert!(!sim);
            }
            _ => panic!("expected the export command"),
        }
    }
}
