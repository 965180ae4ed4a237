// Regras puras do arquivo: sem banco, sem HTTP.
pub mod diagnostic;
pub mod periods;
pub mod valuation;
pub mod volumetry;
