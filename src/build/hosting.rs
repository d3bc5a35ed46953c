//! Hosting-platform config files.
//!
//! Each deployment target owns one well-known config file at the output
//! root. The builder *generates* files for the targets selected in the
//! specification, encoding the redirect table; the `hosting` pipeline task
//! *selects* among files already present (keep selected, optionally delete
//! unselected, strict presence check).

use crate::config::RedirectRule;
use serde_json::json;
use std::{fs, io, path::Path};

/// Known deployment targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostingTarget {
    Apache,
    Iis,
    Nginx,
    Netlify,
    Azure,
    Vercel,
}

impl HostingTarget {
    pub const ALL: [Self; 6] = [
        Self::Apache,
        Self::Iis,
        Self::Nginx,
        Self::Netlify,
        Self::Azure,
        Self::Vercel,
    ];

    /// Resolve a target name or one of its recognized aliases.
    pub fn parse(name: &str) -> Result<Self, String> {
        match name.trim().to_ascii_lowercase().as_str() {
            "apache" | "apache2" => Ok(Self::Apache),
            "iis" | "microsoft-iis" => Ok(Self::Iis),
            "nginx" | "nginx-conf" => Ok(Self::Nginx),
            "netlify" => Ok(Self::Netlify),
            "azure" | "azure-static-web-apps" => Ok(Self::Azure),
            "vercel" => Ok(Self::Vercel),
            other => Err(format!("unsupported target `{other}`")),
        }
    }

    /// The config file this target expects at the output root.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Apache => ".htaccess",
            Self::Iis => "web.config",
            Self::Nginx => "nginx.redirects.conf",
            Self::Netlify => "_redirects",
            Self::Azure => "staticwebapp.config.json",
            Self::Vercel => "vercel.json",
        }
    }

    /// Render the redirect table into this target's format.
    pub fn generate(self, redirects: &[RedirectRule]) -> String {
        match self {
            Self::Apache => {
                let mut out = String::new();
                for r in redirects {
                    out.push_str(&format!("Redirect {} {} {}\n", r.status, r.from, r.to));
                }
                out
            }
            Self::Iis => {
                let mut rules = String::new();
                for r in redirects {
                    rules.push_str(&format!(
                        "      <add wildcard=\"{}\" destination=\"{}\" />\n",
                        r.from, r.to
                    ));
                }
                format!(
                    "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<configuration>\n  \
                     <system.webServer>\n    <httpRedirect enabled=\"true\" \
                     exactDestination=\"true\" httpResponseStatus=\"Permanent\">\n{rules}    \
                     </httpRedirect>\n  </system.webServer>\n</configuration>\n"
                )
            }
            Self::Nginx => {
                let mut out = String::new();
                for r in redirects {
                    out.push_str(&format!(
                        "location = {} {{ return {} {}; }}\n",
                        r.from, r.status, r.to
                    ));
                }
                out
            }
            Self::Netlify => {
                let mut out = String::new();
                for r in redirects {
                    out.push_str(&format!("{} {} {}\n", r.from, r.to, r.status));
                }
                out
            }
            Self::Azure => {
                let routes: Vec<_> = redirects
                    .iter()
                    .map(|r| json!({ "route": r.from, "redirect": r.to, "statusCode": r.status }))
                    .collect();
                format!("{:#}\n", json!({ "routes": routes }))
            }
            Self::Vercel => {
                let rules: Vec<_> = redirects
                    .iter()
                    .map(|r| {
                        json!({
                            "source": r.from,
                            "destination": r.to,
                            "permanent": r.status == 301
                        })
                    })
                    .collect();
                format!("{:#}\n", json!({ "redirects": rules }))
            }
        }
    }
}

/// Parse a selected-target list, rejecting unknown names.
pub fn parse_targets(names: &[String]) -> Result<Vec<HostingTarget>, String> {
    let mut targets = Vec::new();
    for name in names {
        let target = HostingTarget::parse(name)?;
        if !targets.contains(&target) {
            targets.push(target);
        }
    }
    Ok(targets)
}

/// Generate config files for the selected targets (builder path).
pub fn write_selected(
    targets: &[HostingTarget],
    redirects: &[RedirectRule],
    out_dir: &Path,
) -> io::Result<()> {
    for target in targets {
        fs::write(out_dir.join(target.file_name()), target.generate(redirects))?;
    }
    Ok(())
}

/// Outcome of a hosting selection pass over an output directory.
#[derive(Debug, Default)]
pub struct SelectionReport {
    pub kept: Vec<&'static str>,
    pub removed: Vec<&'static str>,
    pub missing: Vec<&'static str>,
}

/// Select hosting artifacts in `out_dir`: report missing selected files,
/// optionally delete files belonging to non-selected targets.
pub fn select_artifacts(
    targets: &[HostingTarget],
    out_dir: &Path,
    remove_unselected: bool,
) -> io::Result<SelectionReport> {
    let mut report = SelectionReport::default();
    for target in HostingTarget::ALL {
        let file = out_dir.join(target.file_name());
        let selected = targets.contains(&target);
        match (selected, file.is_file()) {
            (true, true) => report.kept.push(target.file_name()),
            (true, false) => report.missing.push(target.file_name()),
            (false, true) if remove_unselected => {
                fs::remove_file(&file)?;
                report.removed.push(target.file_name());
            }
            _ => {}
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn redirects() -> Vec<RedirectRule> {
        vec![RedirectRule { from: "/old/".into(), to: "/new/".into(), status: 301 }]
    }

    #[test]
    fn test_target_aliases() {
        assert_eq!(HostingTarget::parse("apache2").unwrap(), HostingTarget::Apache);
        assert_eq!(HostingTarget::parse("microsoft-iis").unwrap(), HostingTarget::Iis);
        assert_eq!(HostingTarget::parse("nginx-conf").unwrap(), HostingTarget::Nginx);
        assert_eq!(
            HostingTarget::parse("azure-static-web-apps").unwrap(),
            HostingTarget::Azure
        );
    }

    #[test]
    fn test_unknown_target_message() {
        let err = HostingTarget::parse("caddy").unwrap_err();
        assert!(err.contains("unsupported target"));
    }

    #[test]
    fn test_generate_formats() {
        let rules = redirects();
        assert_eq!(HostingTarget::Apache.generate(&rules), "Redirect 301 /old/ /new/\n");
        assert!(HostingTarget::Iis.generate(&rules).contains("httpRedirect"));
        assert!(HostingTarget::Nginx.generate(&rules).contains("return 301 /new/;"));
        assert_eq!(HostingTarget::Netlify.generate(&rules), "/old/ /new/ 301\n");
        assert!(HostingTarget::Azure.generate(&rules).contains("\"statusCode\": 301"));
        assert!(HostingTarget::Vercel.generate(&rules).contains("\"permanent\": true"));
    }

    #[test]
    fn test_selection_removes_unselected_keeps_selected() {
        let dir = tempfile::tempdir().unwrap();
        for target in HostingTarget::ALL {
            fs::write(dir.path().join(target.file_name()), "x").unwrap();
        }
        let selected = parse_targets(&["apache".into(), "iis".into()]).unwrap();
        let report = select_artifacts(&selected, dir.path(), true).unwrap();

        assert!(dir.path().join(".htaccess").is_file());
        assert!(dir.path().join("web.config").is_file());
        for gone in ["_redirects", "staticwebapp.config.json", "vercel.json", "nginx.redirects.conf"] {
            assert!(!dir.path().join(gone).exists(), "{gone} should be removed");
        }
        assert_eq!(report.kept.len(), 2);
        assert_eq!(report.removed.len(), 4);
        assert!(report.missing.is_empty());
    }

    #[test]
    fn test_selection_reports_missing() {
        let dir = tempfile::tempdir().unwrap();
        let selected = parse_targets(&["vercel".into()]).unwrap();
        let report = select_artifacts(&selected, dir.path(), false).unwrap();
        assert_eq!(report.missing, vec!["vercel.json"]);
    }
}
