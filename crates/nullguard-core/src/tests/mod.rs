/*! Cross-module coverage for the core IR.
 *
 * Visitors, the text form and the fingerprints are only useful if they agree on what a tree
 * contains. These tests exercise them together on trees shaped like real lowered function bodies.
 */

mod visitor_tests;
