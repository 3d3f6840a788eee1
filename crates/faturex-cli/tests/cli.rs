//! End-to-end tests for the faturex binary.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn nfe_invoice(document_number: &str) -> String {
    format!(
        r#"<nfeProc xmlns="http://www.portalfiscal.inf.br/nfe" versao="4.00">
  <NFe>
    <infNFe Id="NFe25240312345678000190550010000987651000098765">
      <ide>
        <nNF>{document_number}</nNF>
        <dhEmi>2024-03-15T10:00:00</dhEmi>
      </ide>
      <emit>
        <CNPJ>12.345.678/0001-90</CNPJ>
      </emit>
      <det nItem="1">
        <prod>
          <qCom>120,000</qCom>
        </prod>
      </det>
      <total>
        <ICMSTot>
          <vICMS>270,00</vICMS>
          <vNF>1.500,00</vNF>
        </ICMSTot>
      </total>
      <infAdic>
        <infCpl>Período de consumo: 01/02/2024 a 29/02/2024</infCpl>
      </infAdic>
    </infNFe>
  </NFe>
</nfeProc>"#
    )
}

const INCOMPLETE_XML: &str = "<invoice>\
    <tax_id>11.111.111/0001-11</tax_id>\
    <total_amount>1.234,56</total_amount>\
    <total_volume>10,000</total_volume>\
    <issue_date>2024-04-01</issue_date>\
    <period_start>01/03/2024</period_start>\
    <document_number>55555</document_number>\
    <icms_tax_amount>200,00</icms_tax_amount>\
    </invoice>";

struct Workspace {
    dir: TempDir,
    inbox: PathBuf,
    archive: PathBuf,
    ledger: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let inbox = dir.path().join("inbox");
        fs::create_dir_all(&inbox).unwrap();
        Self {
            archive: dir.path().join("processed"),
            ledger: dir.path().join("ledger.csv"),
            inbox,
            dir,
        }
    }

    fn add(&self, name: &str, contents: impl AsRef<[u8]>) {
        fs::write(self.inbox.join(name), contents).unwrap();
    }

    /// Command with config lookups confined to the temp dir.
    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("faturex").unwrap();
        cmd.env("XDG_CONFIG_HOME", self.dir.path());
        cmd
    }

    fn run_cmd(&self) -> Command {
        let mut cmd = self.cmd();
        cmd.arg("run")
            .arg("--inbox")
            .arg(&self.inbox)
            .arg("--archive")
            .arg(&self.archive)
            .arg("--ledger")
            .arg(&self.ledger);
        cmd
    }
}

#[test]
fn test_run_commits_and_archives() {
    let ws = Workspace::new();
    ws.add("nota.xml", nfe_invoice("98765"));

    ws.run_cmd()
        .assert()
        .success()
        .stdout(predicate::str::contains("committed invoice 98765"))
        .stdout(predicate::str::contains("1 committed"));

    assert!(!ws.inbox.join("nota.xml").exists());
    assert!(ws.archive.join("nota.xml").exists());

    let ledger = fs::read_to_string(&ws.ledger).unwrap();
    assert!(ledger.starts_with("CNPJ,VALOR TOTAL"));
    assert!(ledger.contains("12.345.678/0001-90"));
    assert!(ledger.contains("1500.00"));
}

#[test]
fn test_run_skips_second_copy_as_duplicate() {
    let ws = Workspace::new();
    // Same natural key, different invoice numbers.
    ws.add("a.xml", nfe_invoice("98765"));
    ws.add("b.xml", nfe_invoice("11111"));

    ws.run_cmd()
        .assert()
        .success()
        .stdout(predicate::str::contains("1 committed, 1 duplicates"))
        .stdout(predicate::str::contains("already in the ledger"));

    assert!(ws.inbox.join("b.xml").exists());
}

#[test]
fn test_run_leaves_incomplete_file_in_inbox() {
    let ws = Workspace::new();
    ws.add("fatura.xml", INCOMPLETE_XML);

    ws.run_cmd()
        .assert()
        .success()
        .stdout(predicate::str::contains("missing mandatory fields: period_end"));

    assert!(ws.inbox.join("fatura.xml").exists());
    assert!(!ws.ledger.exists());
}

#[test]
fn test_run_with_empty_inbox() {
    let ws = Workspace::new();

    ws.run_cmd()
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to do"));
}

#[test]
fn test_run_fails_on_missing_inbox() {
    let ws = Workspace::new();
    fs::remove_dir(&ws.inbox).unwrap();

    ws.run_cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("reading inbox"));
}

#[test]
fn test_inspect_shows_record_without_committing() {
    let ws = Workspace::new();
    ws.add("nota.xml", nfe_invoice("98765"));
    let input = ws.inbox.join("nota.xml");

    ws.cmd()
        .arg("inspect")
        .arg(&input)
        .arg("--format")
        .arg("json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"NUMERO FATURA\": \"98765\""))
        .stdout(predicate::str::contains("1500.00"));

    // Dry run: file stays, no ledger appears.
    assert!(input.exists());
    assert!(!ws.ledger.exists());
}

#[test]
fn test_inspect_reports_rejection() {
    let ws = Workspace::new();
    ws.add("fatura.xml", INCOMPLETE_XML);

    ws.cmd()
        .arg("inspect")
        .arg(ws.inbox.join("fatura.xml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Record would be rejected"))
        .stdout(predicate::str::contains("period_end"));
}

#[test]
fn test_inspect_unknown_file_fails() {
    let ws = Workspace::new();

    ws.cmd()
        .arg("inspect")
        .arg(ws.dir.path().join("missing.xml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_config_show_prints_defaults() {
    let ws = Workspace::new();

    ws.cmd()
        .arg("config")
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("No config file found"))
        .stdout(predicate::str::contains("pdf_distributor"));
}

#[test]
fn test_config_init_refuses_to_overwrite() {
    let ws = Workspace::new();
    let path = ws.dir.path().join("config.json");

    ws.cmd()
        .arg("config")
        .arg("init")
        .arg("--output")
        .arg(&path)
        .assert()
        .success();
    assert!(path.exists());

    ws.cmd()
        .arg("config")
        .arg("init")
        .arg("--output")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_run_uses_config_file_paths() {
    let ws = Workspace::new();
    ws.add("nota.xml", nfe_invoice("98765"));

    let config_path = ws.dir.path().join("config.json");
    let config = format!(
        r#"{{
  "paths": {{
    "inbox_dir": {inbox:?},
    "archive_dir": {archive:?},
    "ledger_file": {ledger:?}
  }}
}}"#,
        inbox = ws.inbox,
        archive = ws.archive,
        ledger = ws.ledger
    );
    fs::write(&config_path, config).unwrap();

    ws.cmd()
        .arg("--config")
        .arg(&config_path)
        .arg("run")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 committed"));

    assert!(ws.archive.join("nota.xml").exists());
}
