//! resource definition documents
//!
//! [ResourceDocuments] tracks
//! - the source path
//! - the root blocks
//! - the root attributes
//! and defines a numeric index for each. Once added those indices are stable
//! (removal is not possible). At this point the loaded files only have to be
//! valid HCL to be accepted.
//!
//! [ResourceSet::new] applies the rules specific to resource definitions:
//! every root structure must be a `<family> "<name>" {}` block for a known
//! [Family], names are unique per family, and each block body converts into
//! the human form [Value] tree the conversion engine consumes. Attribute
//! expressions must be literals; nested blocks become sequences of mappings,
//! which is exactly the human block shape.
use crate::registry::Family;
use crate::value::Value;
use hcl_edit::structure::{Attribute, Block, Body, Structure};
use std::path::Path;

#[derive(Default, Debug)]
pub struct ResourceDocuments {
    sources: Vec<Source>,
    root_attributes: Vec<(usize, Attribute)>,
    root_blocks: Vec<(usize, Block)>,
}

impl ResourceDocuments {
    /// Inserts and indexes an hcl document
    pub fn insert(&mut self, document: Body, path: impl Into<Option<std::path::PathBuf>>) {
        let source_index = self.sources.len();
        self.sources.push(path.into());

        for structure in document.into_iter() {
            match structure {
                Structure::Block(block) => self.root_blocks.push((source_index, block)),
                Structure::Attribute(attribute) => {
                    self.root_attributes.push((source_index, attribute))
                }
            }
        }
    }

    pub fn attributes(&self) -> impl Iterator<Item = SourceAttribute> {
        self.root_attributes
            .iter()
            .enumerate()
            .map(|(index, (source_index, attribute))| {
                (index, &self.sources[*source_index], attribute)
            })
    }

    pub fn get_block(&self, index: usize) -> SourceBlock {
        let (source_index, block) = &self.root_blocks[index];
        (index, &self.sources[*source_index], block)
    }

    pub fn blocks(&self) -> impl Iterator<Item = SourceBlock> {
        self.root_blocks
            .iter()
            .enumerate()
            .map(|(index, (source_index, block))| (index, &self.sources[*source_index], block))
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }
}

impl ResourceDocuments {
    pub fn load_file(&mut self, file_path: &Path) -> Result<(), LoadError> {
        let file_path = file_path.canonicalize()?;
        tracing::info!(path=%file_path.display(), "loading file");

        let file_contents = std::fs::read_to_string(&file_path)?;
        let body = hcl_edit::parser::parse_body(&file_contents)?;

        self.insert(body, Some(file_path));
        Ok(())
    }

    pub fn load_directory(&mut self, dir_path: &Path) -> Result<(), LoadError> {
        let mut any_files_loaded = false;

        let read_dir = std::fs::read_dir(dir_path)?;
        for dir_entry in read_dir {
            let dir_entry = dir_entry?;
            if !dir_entry.file_type()?.is_file() {
                continue;
            }

            let is_resource_file = dir_entry.file_name().to_string_lossy().ends_with(".rc.hcl");
            if !is_resource_file {
                continue;
            }

            let file_path = dir_entry.path();
            self.load_file(&file_path)?;
            any_files_loaded = true;
        }

        if !any_files_loaded {
            return Err(LoadError::NoFilesFound);
        }

        Ok(())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("No files found in directory")]
    NoFilesFound,
    #[error("IO error")]
    IoError(#[from] std::io::Error),
    #[error("Unable to parse hcl file")]
    HclParseFailed(#[from] hcl_edit::parser::Error),
}

impl From<Body> for ResourceDocuments {
    fn from(value: Body) -> Self {
        let mut documents = ResourceDocuments::default();
        documents.insert(value, None);
        documents
    }
}

/// Utility macro to create [ResourceDocuments]
///
/// Create from a single document
/// ```
/// # use wireform::resource_documents;
/// resource_documents!("dataset \"sales\" {}");
/// ```
///
/// Create from multiple documents (path required)
/// ```
/// # use wireform::resource_documents;
/// resource_documents! {
///   "one.rc.hcl" => "dataset \"one\" {}",
///   "two.rc.hcl" => "dataset \"two\" {}"
/// };
/// ```
///
/// # Panic
/// Panics on invalid input
///
/// ```should_panic
/// # use wireform::resource_documents;
/// resource_documents!("not = valid = hcl");
/// ```
#[macro_export]
macro_rules! resource_documents {
    // single document without source
    { $expr:expr } => {
        $crate::documents::ResourceDocuments::from(hcl_edit::parser::parse_body($expr).expect("body must parse"))
    };
    // multi document with sources
    { $($source:expr => $expr:expr),+ } => {{
        let mut docs = $crate::documents::ResourceDocuments::default();
        $(
            docs.insert(hcl_edit::parser::parse_body($expr).expect("body must parse"), Some($source.into()));
        )+

        docs
    }};
}

pub type Source = Option<std::path::PathBuf>;
pub type SourceAttribute<'a> = (usize, &'a Source, &'a Attribute);
pub type SourceBlock<'a> = (usize, &'a Source, &'a Block);

/// One accepted resource definition in human form
#[derive(Debug)]
pub struct Resource {
    pub family: Family,
    pub name: String,
    pub config: Value,
    pub block_index: usize,
}

/// All resource definitions of a document collection
#[derive(Debug)]
pub struct ResourceSet {
    resources: Vec<Resource>,
}

impl ResourceSet {
    pub fn new(documents: &ResourceDocuments) -> Result<Self, ParseIssues> {
        let mut e = ParseIssues::new();
        let mut accepted: Vec<(usize, Family, String)> = Vec::new();

        for (index, _source, _attribute) in documents.attributes() {
            e.log(Issue::RootAttribute(index));
        }

        for (index, _source, block) in documents.blocks() {
            let Some(family) = Family::from_ident(block.ident.value().as_str()) else {
                e.log(Issue::UnknownResourceKind(index));
                continue;
            };

            if block.labels.is_empty() {
                e.log(Issue::ResourceNameMissing(index));
                continue;
            }

            if block.labels.len() > 1 {
                e.log(Issue::ResourceTooManyLabels(index));
                continue;
            }

            let name = block.labels[0].as_str().to_string();

            if let Some((existing, _, _)) = accepted
                .iter()
                .find(|(_, existing_family, existing_name)| {
                    *existing_family == family && existing_name == &name
                })
            {
                e.log(Issue::ResourceNameCollision {
                    existing: *existing,
                    new: index,
                });
                continue;
            }

            accepted.push((index, family, name));
        }

        if !e.issues.is_empty() {
            return Err(e);
        }

        let mut resources = Vec::with_capacity(accepted.len());
        for (block_index, family, name) in accepted {
            let block = documents.get_block(block_index).2;
            let config = body_value(&block.body, block_index, &mut e);

            tracing::trace!(%family, name, "resource parsed");
            resources.push(Resource {
                family,
                name,
                config,
                block_index,
            });
        }

        if !e.issues.is_empty() {
            return Err(e);
        }

        Ok(Self { resources })
    }

    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter()
    }

    pub fn get(&self, family: Family, name: &str) -> Option<&Resource> {
        self.resources
            .iter()
            .find(|resource| resource.family == family && resource.name == name)
    }
}

/// Convert a block body into a human form mapping
///
/// Attribute expressions must be literal; nested blocks accumulate under
/// their identifier as a sequence of mappings.
fn body_value(body: &Body, block_index: usize, e: &mut ParseIssues) -> Value {
    let mut out = indexmap::IndexMap::<String, Value>::new();

    for structure in body.clone().into_iter() {
        match structure {
            Structure::Attribute(attribute) => {
                let key = attribute.key.value().to_string();
                let expression: hcl::Expression = attribute.value.into();

                let Some(value) = literal_value(expression) else {
                    e.log(Issue::UnsupportedExpression {
                        block: block_index,
                        attribute: key,
                    });
                    continue;
                };

                if out.insert(key.clone(), value).is_some() {
                    e.log(Issue::DuplicateKey {
                        block: block_index,
                        key,
                    });
                }
            }
            Structure::Block(block) => {
                if !block.labels.is_empty() {
                    e.log(Issue::NestedBlockLabel {
                        block: block_index,
                        ident: block.ident.value().to_string(),
                    });
                    continue;
                }

                let key = block.ident.value().to_string();
                let child = body_value(&block.body, block_index, e);

                match out.entry(key.clone()).or_insert_with(|| Value::Array(vec![])) {
                    Value::Array(items) => items.push(child),
                    _ => e.log(Issue::DuplicateKey {
                        block: block_index,
                        key,
                    }),
                }
            }
        }
    }

    Value::Object(out)
}

/// Literal-only expression conversion
///
/// Variables, traversals, templates and `null` have no meaning in a resource
/// definition; the caller reports them as issues instead of panicking.
fn literal_value(expression: hcl::Expression) -> Option<Value> {
    use hcl::Expression;

    match expression {
        Expression::Bool(b) => Some(b.into()),
        Expression::Number(num) => {
            if let Some(int) = num.as_i64() {
                return Some(Value::Integer(int));
            }

            num.as_f64().map(Value::Decimal)
        }
        Expression::String(s) => Some(s.into()),
        Expression::Array(items) => Some(Value::Array(
            items.into_iter().map(literal_value).collect::<Option<_>>()?,
        )),
        Expression::Object(fields) => Some(Value::Object(
            fields
                .into_iter()
                .map(|(key, value)| literal_value(value).map(|value| (key.to_string(), value)))
                .collect::<Option<_>>()?,
        )),
        _ => None,
    }
}

#[derive(derive_new::new, Debug)]
pub struct ParseIssues {
    #[new(default)]
    issues: Vec<Issue>,
}

impl ParseIssues {
    pub fn log(&mut self, issue: Issue) {
        tracing::trace!(?issue, "issue found");
        self.issues.push(issue);
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }
}

impl std::error::Error for ParseIssues {}

impl std::fmt::Display for ParseIssues {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use std::fmt::Debug;
        self.issues.first().unwrap().fmt(f)
    }
}

#[derive(Debug, PartialEq)]
pub enum Issue {
    RootAttribute(usize),
    UnknownResourceKind(usize),
    ResourceNameMissing(usize),
    ResourceTooManyLabels(usize),
    ResourceNameCollision { existing: usize, new: usize },
    NestedBlockLabel { block: usize, ident: String },
    UnsupportedExpression { block: usize, attribute: String },
    DuplicateKey { block: usize, key: String },
}
