/// Static information screens, selected explicitly by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoPage {
    ContactUs,
    AboutUs,
}

impl InfoPage {
    pub fn title(self) -> &'static str {
        match self {
            InfoPage::ContactUs => "Contact Us",
            InfoPage::AboutUs => "About Us",
        }
    }

    pub fn subtitle(self) -> &'static str {
        match self {
            InfoPage::ContactUs => "Get in touch with us",
            InfoPage::AboutUs => "Learn more about the app",
        }
    }

    pub fn body(self) -> &'static str {
        match self {
            InfoPage::ContactUs => {
                "Questions, bug reports and feature requests are welcome.\n\
                 Open an issue on the project tracker or write to the maintainers \
                 listed in the package metadata."
            }
            InfoPage::AboutUs => {
                "qrpocket generates, scans, saves and deletes QR codes.\n\n\
                 Generated codes are kept in a local database so they can be listed \
                 and exported later. Scanning reads frames from a camera source and \
                 shows each newly decoded payload with options to copy it or open it \
                 as a link."
            }
        }
    }

    /// Full text as printed by the CLI
    pub fn render(self) -> String {
        format!("{}\n{}\n\n{}\n", self.title(), self.subtitle(), self.body())
    }
}
