//! Hierarchical diff trees built by merge-joining sorted member listings

use std::cmp::Ordering;

use serde::Serialize;
use sync_fs::NormalizedPath;
use tracing::{debug, trace};

use crate::cancel::{CancellationToken, checkpoint};
use crate::compare::VariantComparator;
use crate::store::{VariantStore, members_of};
use crate::variant::{Members, TreeVariant, Variant};
use crate::{Error, Result};

/// How a diff node relates its left side to its right side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffKind {
    /// Only the left side has the entry
    Addition,
    /// Only the right side has the entry
    Deletion,
    /// Both sides have it with different content or type
    Change,
}

/// One node of a diff tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffNode {
    pub left: Option<Variant>,
    pub right: Option<Variant>,
    pub kind: DiffKind,
    pub children: Vec<DiffNode>,
}

impl DiffNode {
    fn new(left: Option<&Variant>, right: Option<&Variant>, kind: DiffKind) -> Self {
        Self {
            left: left.map(detach),
            right: right.map(detach),
            kind,
            children: Vec::new(),
        }
    }

    fn side(&self) -> Option<&Variant> {
        self.left.as_ref().or(self.right.as_ref())
    }

    pub fn name(&self) -> &str {
        self.side().map(Variant::name).unwrap_or_default()
    }

    pub fn path(&self) -> Option<&NormalizedPath> {
        self.side().map(Variant::path)
    }

    /// No differences below this node.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of descendant nodes.
    pub fn len(&self) -> usize {
        self.children.iter().map(|c| 1 + c.len()).sum()
    }

    /// Visit every descendant in pre-order with its depth below this node.
    pub fn walk<F>(&self, mut visit: F)
    where
        F: FnMut(usize, &DiffNode),
    {
        fn go<F: FnMut(usize, &DiffNode)>(node: &DiffNode, depth: usize, visit: &mut F) {
            for child in &node.children {
                visit(depth, child);
                go(child, depth + 1, visit);
            }
        }
        go(self, 0, &mut visit);
    }
}

/// Builds [`DiffNode`] trees between two variants.
///
/// Member listings MUST be sorted by name ascending in byte order. The
/// builder never sorts; unsorted listings produce a wrong diff.
#[derive(Clone)]
pub struct DiffBuilder<'a> {
    comparator: VariantComparator<'a>,
    cancel: Option<CancellationToken>,
}

impl<'a> DiffBuilder<'a> {
    pub fn new(store: &'a dyn VariantStore) -> Self {
        Self::with_comparator(VariantComparator::new(store))
    }

    pub fn with_comparator(comparator: VariantComparator<'a>) -> Self {
        Self {
            comparator,
            cancel: None,
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn with_byte_compare(mut self, enabled: bool) -> Self {
        self.comparator = self.comparator.with_byte_compare(enabled);
        self
    }

    fn store(&self) -> &'a dyn VariantStore {
        self.comparator.store()
    }

    /// Diff `left` against `right`. The root node is always a `Change`.
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedVariant`] if a root does not exist or a listing
    ///   contains an invalid member
    /// - [`Error::ContentRead`] when members or bytes cannot be read
    /// - [`Error::Cancelled`] when the token fires between members
    pub fn diff(&self, left: &Variant, right: &Variant) -> Result<DiffNode> {
        require_exists(left, "diff root does not exist")?;
        require_exists(right, "diff root does not exist")?;

        let node = self.compare(left, right)?;
        debug!(
            left = %left.path(),
            right = %right.path(),
            differences = node.len(),
            "Built diff tree"
        );
        Ok(node)
    }

    /// A one-sided subtree: every descendant of `variant` as an `Addition`
    /// (left only) or `Deletion` (right only).
    pub fn expand(&self, variant: &Variant, kind: DiffKind) -> Result<DiffNode> {
        require_exists(variant, "expanded root does not exist")?;
        self.one_sided(variant, kind)
    }

    fn compare(&self, left: &Variant, right: &Variant) -> Result<DiffNode> {
        let (Variant::Tree(lt), Variant::Tree(rt)) = (left, right) else {
            return Ok(DiffNode::new(Some(left), Some(right), DiffKind::Change));
        };

        let lc = self.listing(lt)?;
        let rc = self.listing(rt)?;
        let mut node = DiffNode::new(Some(left), Some(right), DiffKind::Change);

        let (mut li, mut ri) = (0, 0);
        while li < lc.len() && ri < rc.len() {
            checkpoint(self.cancel.as_ref())?;
            let (l, r) = (&lc[li], &rc[ri]);
            match l.name().as_bytes().cmp(r.name().as_bytes()) {
                Ordering::Equal => {
                    if let Some(child) = self.matched(l, r)? {
                        node.children.push(child);
                    }
                    li += 1;
                    ri += 1;
                }
                Ordering::Less => {
                    node.children.push(self.one_sided(l, DiffKind::Addition)?);
                    li += 1;
                }
                Ordering::Greater => {
                    node.children.push(self.one_sided(r, DiffKind::Deletion)?);
                    ri += 1;
                }
            }
        }
        for l in &lc[li..] {
            checkpoint(self.cancel.as_ref())?;
            node.children.push(self.one_sided(l, DiffKind::Addition)?);
        }
        for r in &rc[ri..] {
            checkpoint(self.cancel.as_ref())?;
            node.children.push(self.one_sided(r, DiffKind::Deletion)?);
        }

        Ok(node)
    }

    /// Same-named members. Trees without a recorded identity on both sides
    /// are equal by position only, so they are descended and kept only when
    /// something below differs.
    fn matched(&self, left: &Variant, right: &Variant) -> Result<Option<DiffNode>> {
        if let (Variant::Tree(lt), Variant::Tree(rt)) = (left, right)
            && (lt.tree_id.is_none() || rt.tree_id.is_none())
        {
            let child = self.compare(left, right)?;
            return Ok((!child.is_empty()).then_some(child));
        }

        if self.comparator.equal(Some(left), Some(right))? {
            trace!(path = %left.path(), "Members equal, skipped");
            return Ok(None);
        }
        self.compare(left, right).map(Some)
    }

    fn one_sided(&self, variant: &Variant, kind: DiffKind) -> Result<DiffNode> {
        let mut node = match kind {
            DiffKind::Deletion => DiffNode::new(None, Some(variant), kind),
            _ => DiffNode::new(Some(variant), None, kind),
        };
        if let Variant::Tree(tree) = variant {
            for member in self.listing(tree)?.iter() {
                checkpoint(self.cancel.as_ref())?;
                node.children.push(self.one_sided(member, kind)?);
            }
        }
        Ok(node)
    }

    fn listing<'t>(&self, tree: &'t TreeVariant) -> Result<std::borrow::Cow<'t, [Variant]>> {
        let members = members_of(self.store(), tree)?;
        for member in members.iter() {
            validate_member(member)?;
        }
        Ok(members)
    }
}

fn require_exists(variant: &Variant, reason: &str) -> Result<()> {
    if variant.exists() {
        Ok(())
    } else {
        Err(Error::malformed(variant.path().as_str(), reason))
    }
}

fn validate_member(member: &Variant) -> Result<()> {
    let name = member.name();
    if name.is_empty() {
        return Err(Error::malformed(member.path().as_str(), "member has an empty name"));
    }
    if name.contains('/') {
        return Err(Error::malformed(
            member.path().as_str(),
            "member name contains a path separator",
        ));
    }
    require_exists(member, "listed member does not exist")
}

/// Nodes keep the variant itself; members live in the child nodes.
fn detach(variant: &Variant) -> Variant {
    match variant {
        Variant::Blob(blob) => Variant::Blob(blob.clone()),
        Variant::Tree(tree) => Variant::Tree(TreeVariant {
            exists: tree.exists,
            name: tree.name.clone(),
            path: tree.path.clone(),
            revision: tree.revision.clone(),
            tree_id: tree.tree_id.clone(),
            members: Members::Deferred,
        }),
    }
}
