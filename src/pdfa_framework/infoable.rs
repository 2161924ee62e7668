use anyhow::Result;

pub trait Infoable {
    fn info(&self, f: &mut impl std::io::Write) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use crate::pdfa_framework::infoable::Infoable;

    #[test]
    fn all_infoable() {
        for (path, descriptor) in crate::tests::get_valid_test_files() {
            let mut f = vec![];
            descriptor.info(&mut f).unwrap();
            assert!(!f.is_empty(), "no info for {}", path.display());
        }
    }
}
