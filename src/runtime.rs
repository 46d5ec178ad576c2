//! Runtimes published as tarballs with a version catalog

/// Kind of runtime installed from the tarball endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Runtime {
    Ruby,
    Python,
    Nodejs,
    Php,
    Go,
    OpenJdk,
    Nginx,
}

impl Runtime {
    /// Returns the name used in catalog and download URLs
    pub fn as_str(&self) -> &'static str {
        match self {
            Runtime::Ruby => "ruby",
            Runtime::Python => "python",
            Runtime::Nodejs => "nodejs",
            Runtime::Php => "php",
            Runtime::Go => "go",
            Runtime::OpenJdk => "openjdk",
            Runtime::Nginx => "nginx",
        }
    }
}

impl std::fmt::Display for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Runtime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ruby" => Ok(Runtime::Ruby),
            "python" => Ok(Runtime::Python),
            "nodejs" => Ok(Runtime::Nodejs),
            "php" => Ok(Runtime::Php),
            "go" => Ok(Runtime::Go),
            "openjdk" => Ok(Runtime::OpenJdk),
            "nginx" => Ok(Runtime::Nginx),
            other => Err(format!("unknown runtime: {other}")),
        }
    }
}
