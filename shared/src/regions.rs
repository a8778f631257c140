/// IBGE federative unit codes: (two-digit code, abbreviation, state name).
/// The first two digits of every IBGE municipality code are its state code.
pub const BRAZIL_STATES: [(&str, &str, &str); 27] = [
    ("11", "RO", "Rondônia"),
    ("12", "AC", "Acre"),
    ("13", "AM", "Amazonas"),
    ("14", "RR", "Roraima"),
    ("15", "PA", "Pará"),
    ("16", "AP", "Amapá"),
    ("17", "TO", "Tocantins"),
    ("21", "MA", "Maranhão"),
    ("22", "PI", "Piauí"),
    ("23", "CE", "Ceará"),
    ("24", "RN", "Rio Grande do Norte"),
    ("25", "PB", "Paraíba"),
    ("26", "PE", "Pernambuco"),
    ("27", "AL", "Alagoas"),
    ("28", "SE", "Sergipe"),
    ("29", "BA", "Bahia"),
    ("31", "MG", "Minas Gerais"),
    ("32", "ES", "Espírito Santo"),
    ("33", "RJ", "Rio de Janeiro"),
    ("35", "SP", "São Paulo"),
    ("41", "PR", "Paraná"),
    ("42", "SC", "Santa Catarina"),
    ("43", "RS", "Rio Grande do Sul"),
    ("50", "MS", "Mato Grosso do Sul"),
    ("51", "MT", "Mato Grosso"),
    ("52", "GO", "Goiás"),
    ("53", "DF", "Distrito Federal"),
];

/// State abbreviation for a two-digit IBGE code.
pub fn uf_abbreviation(code: &str) -> Option<&'static str> {
    BRAZIL_STATES
        .iter()
        .find(|(c, _, _)| *c == code)
        .map(|(_, abbrev, _)| *abbrev)
}

/// State abbreviation for a full municipality identifier (e.g. `"3550308"`).
pub fn uf_for_municipality(id: &str) -> Option<&'static str> {
    let code = id.get(..2)?;
    uf_abbreviation(code)
}
