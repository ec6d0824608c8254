//! List command - dump every candidate in the pool.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use depchase_pm::Pool;

use super::{GlobalArgs, Session};

#[derive(Args, Debug, Default)]
pub struct ListRpmsArgs {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RpmRecord {
    pub name: String,
    /// Source package the binary belongs to
    pub package_name: String,
    pub epoch: Option<u32>,
    pub version: String,
    pub release: Option<String>,
    pub arch: String,
}

pub async fn execute(global: &GlobalArgs, _args: ListRpmsArgs) -> Result<i32> {
    let session = Session::load(global)?;
    let records = list_rpms(&session.pool);
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(0)
}

pub fn list_rpms(pool: &Pool) -> Vec<RpmRecord> {
    pool.iter()
        .map(|(_, c)| {
            let package_name = if c.arch == "src" || c.arch == "nosrc" {
                c.name.clone()
            } else {
                c.source_name().unwrap_or(&c.name).to_string()
            };
            RpmRecord {
                name: c.name.clone(),
                package_name,
                epoch: c.evr.has_epoch().then(|| c.evr.epoch()),
                version: c.evr.version().to_string(),
                release: c.evr.release().map(str::to_string),
                arch: c.arch.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use depchase_pm::{ArraySource, PackageCandidate, SourceKind};
    use depchase_rpmver::Evr;

    #[test]
    fn test_list_rpms() {
        let mut bin = PackageCandidate::new("glib2-devel", Evr::parse("1:2.80.0-1.fc40").unwrap(), "x86_64");
        bin.sourcerpm = Some("glib2-2.80.0-1.fc40.src.rpm".to_string());
        let src = PackageCandidate::new("glib2", Evr::parse("2.80.0-1.fc40").unwrap(), "src");
        let orphan = PackageCandidate::new("orphan", Evr::parse("3").unwrap(), "noarch");

        let source = ArraySource::new("fedora", SourceKind::Official)
            .with_candidates([bin, src, orphan]);
        let mut builder = Pool::builder();
        builder.add_source(&source).unwrap();
        let pool = builder.build().unwrap();

        let records = list_rpms(&pool);
        assert_eq!(records.len(), 3);

        let devel = records.iter().find(|r| r.name == "glib2-devel").unwrap();
        assert_eq!(devel.package_name, "glib2");
        assert_eq!(devel.epoch, Some(1));
        assert_eq!(devel.version, "2.80.0");
        assert_eq!(devel.release.as_deref(), Some("1.fc40"));

        let src = records.iter().find(|r| r.arch == "src").unwrap();
        assert_eq!(src.package_name, "glib2");

        let orphan = records.iter().find(|r| r.name == "orphan").unwrap();
        assert_eq!(orphan.package_name, "orphan");
        assert_eq!(orphan.epoch, None);
        assert_eq!(orphan.release, None);
    }
}
