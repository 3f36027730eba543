use std::collections::HashMap;

use crate::{
    error::{Error, Result, ValidationError},
    types::Playlist,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

struct Walker<'a, F> {
    definitions: &'a HashMap<String, Playlist>,
    edges: F,
    marks: HashMap<&'a str, Mark>,
    path: Vec<&'a str>,
    order: Vec<String>,
}

impl<'a, F> Walker<'a, F>
where
    F: Fn(&'a Playlist) -> Vec<&'a str>,
{
    fn visit(&mut self, name: &'a str, playlist: &'a Playlist) -> Result<()> {
        match self.marks.get(name) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::InProgress) => {
                let start = self.path.iter().position(|n| *n == name).unwrap_or(0);
                let mut cycle: Vec<String> =
                    self.path[start..].iter().map(|n| n.to_string()).collect();
                cycle.push(name.to_string());
                return Err(ValidationError::Cycle(cycle).into());
            }
            None => {}
        }

        self.marks.insert(name, Mark::InProgress);
        self.path.push(name);

        let definitions = self.definitions;
        for reference in (self.edges)(playlist) {
            let Some((key, referenced)) = definitions.get_key_value(reference) else {
                return Err(ValidationError::DanglingReference {
                    from: name.to_string(),
                    missing: reference.to_string(),
                }
                .into());
            };
            self.visit(key.as_str(), referenced)?;
        }

        self.path.pop();
        self.marks.insert(name, Mark::Done);
        self.order.push(name.to_string());
        Ok(())
    }
}

/// Computes the evaluation order for `target`.
///
/// Walks `edges` depth-first from `target` and returns every reachable
/// playlist exactly once, dependencies before dependents, `target` last.
///
/// # Errors
///
/// - [`Error::NotFound`] when `target` itself is not defined
/// - [`ValidationError::DanglingReference`] when an edge points at an unknown name
/// - [`ValidationError::Cycle`] with the offending path, e.g. `a -> b -> a`
pub fn resolve_order<'a, F>(
    definitions: &'a HashMap<String, Playlist>,
    target: &str,
    edges: F,
) -> Result<Vec<String>>
where
    F: Fn(&'a Playlist) -> Vec<&'a str>,
{
    let (name, playlist) = definitions
        .get_key_value(target)
        .ok_or_else(|| Error::not_found("playlist", target))?;

    let mut walker = Walker {
        definitions,
        edges,
        marks: HashMap::new(),
        path: Vec::new(),
        order: Vec::new(),
    };
    walker.visit(name.as_str(), playlist)?;
    Ok(walker.order)
}

/// Every stored reference of `playlist`, in stored order.
pub fn all_references(playlist: &Playlist) -> Vec<&str> {
    playlist
        .playlist_references
        .iter()
        .map(String::as_str)
        .collect()
}
