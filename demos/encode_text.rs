use huffman_tree::{IoBitReader, IoBitWriter, Tree, ALPHABET_SIZE};
use std::io::Cursor;

fn main() -> huffman_tree::Result<()> {
    let s = String::from("Hello my name is Sam!");

    let mut freq = [0u64; ALPHABET_SIZE];
    for b in s.bytes() {
        freq[b as usize] += 1;
    }
    let tree = Tree::build(&freq);

    // shape first, then the message
    let mut out = IoBitWriter::new(Vec::new());
    tree.serialize_shape(&mut out)?;
    for b in s.bytes() {
        tree.encode(b, &mut out)?;
    }
    let bytes = out.finish()?;
    println!("{} bytes in, {} bytes out", s.len(), bytes.len());

    let mut input = IoBitReader::new(Cursor::new(bytes));
    let rebuilt = Tree::deserialize_shape(&mut input)?;
    let dec = (0..s.len())
        .map(|_| rebuilt.decode(&mut input))
        .collect::<huffman_tree::Result<Vec<u8>>>()?;

    println!("{:?}", String::from_utf8(dec));
    Ok(())
}
