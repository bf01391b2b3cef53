use phf::{Map, Set, phf_map, phf_set};

/// Residue name of the N-terminal acetyl cap.
pub const N_CAP_RESIDUE: &str = "ACE";
/// Residue name of the C-terminal N-methylamide cap.
pub const C_CAP_RESIDUE: &str = "NME";

/// Atom type the typing tool assigns to the dummy atoms of a residue template.
pub const DUMMY_ATOM_TYPE: &str = "DU";
/// Atom name the typing tool assigns to the dummy atoms of a residue template.
pub const DUMMY_ATOM_NAME: &str = "DUMM";

/// Character marking a cross-residue bond partner (`+M`, `-M`) in template records.
pub const LINKAGE_MARKER: char = 'M';

static HALOGEN_PREFIXES: Set<&'static str> = phf_set! { "CL", "Cl", "BR", "Br" };

// Numeric-prefixed hydrogen names produced by the system builder, mapped to the
// trailing-digit form the residue template format uses.
static HYDROGEN_NAME_CANONICAL: Map<&'static str, &'static str> = phf_map! {
    " 2HB " => " HB2 ", " 3HB " => " HB3 ",
    " 1H1 " => " H11 ", " 2H1 " => " H12 ", " 3H1 " => " H13 ",
    " 1H2 " => " H21 ", " 2H2 " => " H22 ", " 3H2 " => " H23 ",
    " 1H5 " => " H51 ", " 2H5 " => " H52 ", " 3H5 " => " H53 ",
    " 1H1' " => " H1'1 ", " 2H1' " => " H1'2 ", " 3H1' " => " H1'3 ",
    " 1H2' " => " H2'1 ", " 2H2' " => " H2'2 ", " 3H2' " => " H2'3 ",
    " 1H5' " => " H5'1 ", " 2H5' " => " H5'2 ", " 3H5' " => " H5'3 ",
};

/// Returns the element class of an atom name: a two-letter halogen prefix when
/// the name starts with one, otherwise the first character.
pub fn element_class(atom_name: &str) -> &str {
    let name = atom_name.trim();
    if let Some(prefix) = name.get(0..2) {
        if HALOGEN_PREFIXES.contains(prefix) {
            return prefix;
        }
    }
    name.chars().next().map_or("", |c| &name[..c.len_utf8()])
}

pub fn is_backbone_linkage(atom_name: &str) -> bool {
    atom_name.contains(LINKAGE_MARKER)
}

/// Rewrites numeric-prefixed hydrogen names to their trailing-digit form.
///
/// Every pattern is replaced until none remains, so the result is a fixed point:
/// feeding the output back in returns it unchanged. A name in the last field of
/// a line matches as if a space followed it.
pub fn canonicalize_hydrogen_names(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);
        let ending = &line[content.len()..];
        let mut padded = format!("{} ", content);
        for (pattern, replacement) in HYDROGEN_NAME_CANONICAL.entries() {
            // Adjacent matches share a delimiting space, hence the loop.
            while padded.contains(pattern) {
                padded = padded.replace(pattern, replacement);
            }
        }
        // Every replacement keeps the trailing space.
        padded.pop();
        output.push_str(&padded);
        output.push_str(ending);
    }
    output
}
